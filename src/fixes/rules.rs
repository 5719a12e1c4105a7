//! The fix catalog: one mechanical transformation per gap kind

use super::line_break::break_line;
use super::FixOutcome;
use crate::config::DetectionConfig;
use crate::models::{FixHint, Gap, GapKind};
use crate::parsers::lexical::LexicalScan;
use crate::parsers::{indent_width, indentation};
use regex::Regex;
use std::sync::OnceLock;

static BARE_EXCEPT: OnceLock<Regex> = OnceLock::new();

fn bare_except() -> &'static Regex {
    BARE_EXCEPT.get_or_init(|| Regex::new(r"\bexcept\s*:").expect("valid regex"))
}

fn manual(gap: &Gap) -> FixOutcome {
    FixOutcome::Skipped(format!("{} needs a manual change", gap.kind))
}

/// Byte offset of a character column, `None` past the end of the line
fn byte_offset(line: &str, column: usize) -> Option<usize> {
    if column == line.chars().count() {
        return Some(line.len());
    }
    line.char_indices().nth(column).map(|(i, _)| i)
}

/// Apply the fix for one gap to `lines` (0-based storage, 1-based gap lines)
pub(super) fn apply(
    gap: &Gap,
    lines: &mut Vec<String>,
    scan: &LexicalScan,
    config: &DetectionConfig,
) -> FixOutcome {
    let line_no = gap.location.line;
    if line_no == 0 || gap.location.anchor_line() > lines.len() {
        return FixOutcome::Failed(format!("line {line_no} is out of range"));
    }
    let idx = line_no - 1;

    match gap.kind {
        GapKind::TrailingWhitespace => {
            let trimmed_len = lines[idx].trim_end().len();
            if trimmed_len == lines[idx].len() {
                return FixOutcome::Skipped("no trailing whitespace left".to_string());
            }
            lines[idx].truncate(trimmed_len);
            FixOutcome::Applied
        }
        GapKind::BroadExceptionClause => {
            let line = &lines[idx];
            let from = byte_offset(line, gap.location.column).unwrap_or(0);
            let Some(found) = bare_except().find_at(line, from) else {
                return FixOutcome::Failed("bare except clause not found".to_string());
            };
            let fixed = format!(
                "{}except Exception:{}",
                &line[..found.start()],
                &line[found.end()..]
            );
            lines[idx] = fixed;
            FixOutcome::Applied
        }
        GapKind::MissingDocBlock => match &gap.hint {
            Some(FixHint::DocBlock { indent }) => {
                let doc = format!("{indent}\"\"\"{}\"\"\"", config.doc_placeholder);
                lines.insert(gap.location.anchor_line(), doc);
                FixOutcome::Applied
            }
            _ => FixOutcome::Skipped("no place to insert a doc block".to_string()),
        },
        GapKind::UnusedImport => {
            for line in &mut lines[idx..gap.location.anchor_line()] {
                let indent = indentation(line);
                let rest = &line[indent.len()..];
                if rest.is_empty() || rest.starts_with('#') {
                    continue;
                }
                *line = format!("{indent}# {rest}");
            }
            FixOutcome::Applied
        }
        GapKind::LineTooLong => {
            if lines[idx].chars().count() <= config.max_line_length {
                return FixOutcome::Skipped("line already fits".to_string());
            }
            let state = scan.state(line_no);
            if state.starts_in_string {
                return FixOutcome::Failed("line is inside a string literal".to_string());
            }
            match break_line(&lines[idx], state.depth_at_start, config.max_line_length) {
                Some((head, tail)) => {
                    lines[idx] = head;
                    lines.insert(idx + 1, tail);
                    FixOutcome::Applied
                }
                None => FixOutcome::Failed("no safe break point".to_string()),
            }
        }
        GapKind::MixedIndentation => {
            let indent = indentation(&lines[idx]);
            if !indent.contains('\t') {
                return FixOutcome::Skipped("indentation has no tabs".to_string());
            }
            let width = indent_width(indent, config.tab_size);
            let rest = lines[idx][indent.len()..].to_string();
            lines[idx] = format!("{}{rest}", " ".repeat(width));
            FixOutcome::Applied
        }
        GapKind::UnclosedLiteral | GapKind::MissingBlockTerminator => match &gap.hint {
            Some(FixHint::Insert { column, text }) => {
                match byte_offset(&lines[idx], *column) {
                    Some(at) => {
                        lines[idx].insert_str(at, text);
                        FixOutcome::Applied
                    }
                    None => FixOutcome::Failed(format!("column {column} is out of range")),
                }
            }
            _ => manual(gap),
        },
        GapKind::NamingConventionViolation
        | GapKind::HighComplexity
        | GapKind::UnbalancedBracket
        | GapKind::SyntaxError => manual(gap),
    }
}
