//! Splitting over-long lines at meaning-preserving boundaries

use crate::parsers::indentation;
use crate::parsers::lexical::break_points;

/// Extra indentation of a continuation line
const CONTINUATION_INDENT: &str = "    ";

/// Split `line` in two so the first part fits in `max_len` characters.
///
/// Code lines break after a comma or an opening bracket while inside
/// brackets, choosing the rightmost point that fits. Comment lines break
/// at a space and continue as a new comment. Returns `None` when no point
/// both fits and shortens the line.
pub fn break_line(line: &str, depth_at_start: usize, max_len: usize) -> Option<(String, String)> {
    if line.trim_start().starts_with('#') {
        return break_comment(line, max_len);
    }

    let chars: Vec<char> = line.chars().collect();
    let indent = indentation(line);
    let original_len = chars.len();

    break_points(line, depth_at_start)
        .into_iter()
        .rev()
        .find_map(|point| {
            let head: String = chars[..point].iter().collect();
            let head = head.trim_end().to_string();
            let rest: String = chars[point..].iter().collect();
            let tail = format!("{indent}{CONTINUATION_INDENT}{}", rest.trim_start());
            let fits = head.chars().count() <= max_len;
            let shorter = tail.chars().count() < original_len;
            (fits && shorter && !head.trim().is_empty()).then_some((head, tail))
        })
}

fn break_comment(line: &str, max_len: usize) -> Option<(String, String)> {
    let chars: Vec<char> = line.chars().collect();
    let indent = indentation(line);
    let indent_len = indent.chars().count();
    // keep at least "# " and one word on the first line
    let min_split = indent_len + 2;

    (min_split..chars.len().min(max_len + 1))
        .rev()
        .filter(|&i| chars[i] == ' ')
        .find_map(|i| {
            let head: String = chars[..i].iter().collect();
            let head = head.trim_end().to_string();
            let rest: String = chars[i..].iter().collect();
            let rest = rest.trim_start();
            if rest.is_empty() || head.trim_end_matches('#').trim().is_empty() {
                return None;
            }
            let tail = format!("{indent}# {rest}");
            (tail.chars().count() < chars.len()).then_some((head, tail))
        })
}
