//! Lexical scanner for Python source
//!
//! Tracks string literals, comments and bracket nesting without building a
//! syntax tree. It keeps going on source the structural parser rejects, so
//! it is used to explain structural errors. It also gives per-line context
//! (bracket depth, string membership) to the hygiene checks and to the
//! line breaker.

use super::{indent_width, indentation};

/// Keywords that open a compound statement and need a `:` terminator
const BLOCK_KEYWORDS: &[&str] = &[
    "def", "class", "if", "elif", "else", "for", "while", "try", "except", "finally", "with",
    "async",
];

/// Lexical context of one physical line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineState {
    /// Open brackets before the first character of the line
    pub depth_at_start: usize,
    /// The line begins inside a string that started on an earlier line
    pub starts_in_string: bool,
    /// The line's newline is part of a string literal
    pub ends_in_string: bool,
}

/// A lexical problem. Lines are 1-based, columns are character offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexicalIssue {
    UnterminatedString {
        line: usize,
        column: usize,
        delimiter: String,
        triple: bool,
        /// Line the literal runs to; later than `line` after a `\` continuation
        end_line: usize,
        /// Where the closing delimiter would go on `end_line`
        end_column: usize,
    },
    UnmatchedCloser {
        line: usize,
        column: usize,
        found: char,
    },
    MismatchedCloser {
        line: usize,
        column: usize,
        expected: char,
        found: char,
    },
    UnclosedBracket {
        line: usize,
        column: usize,
        open: char,
    },
    MissingColon {
        line: usize,
        column: usize,
        keyword: String,
        /// Header is one physical line and the next code line is indented deeper
        unambiguous: bool,
    },
}

impl LexicalIssue {
    pub fn line(&self) -> usize {
        match self {
            LexicalIssue::UnterminatedString { line, .. }
            | LexicalIssue::UnmatchedCloser { line, .. }
            | LexicalIssue::MismatchedCloser { line, .. }
            | LexicalIssue::UnclosedBracket { line, .. }
            | LexicalIssue::MissingColon { line, .. } => *line,
        }
    }

    /// Issues that make the source invalid on their own
    pub fn is_hard(&self) -> bool {
        !matches!(self, LexicalIssue::MissingColon { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct LexicalScan {
    pub lines: Vec<LineState>,
    pub issues: Vec<LexicalIssue>,
}

impl LexicalScan {
    pub fn has_hard_errors(&self) -> bool {
        self.issues.iter().any(LexicalIssue::is_hard)
    }

    pub fn hard_error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_hard()).count()
    }

    /// 1-based access; lines past the end have a default state
    pub fn state(&self, line: usize) -> LineState {
        line.checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .copied()
            .unwrap_or_default()
    }
}

fn closer_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

struct OpenString {
    quote: char,
    triple: bool,
    line: usize,
    column: usize,
}

/// A logical line being accumulated across physical lines
struct Logical {
    start: usize,
    keyword: Option<String>,
    colon_at_depth0: bool,
    last_line: usize,
    last_end: usize,
}

struct PendingColon {
    issue: usize,
    start: usize,
    end: usize,
}

fn leading_keyword(chars: &[char], from: usize) -> Option<String> {
    let word: String = chars[from..]
        .iter()
        .take_while(|c| c.is_alphanumeric() || **c == '_')
        .collect();
    BLOCK_KEYWORDS.contains(&word.as_str()).then_some(word)
}

/// Scan physical lines (without terminators)
pub fn scan<S: AsRef<str>>(lines: &[S]) -> LexicalScan {
    let mut result = LexicalScan {
        lines: Vec::with_capacity(lines.len()),
        issues: Vec::new(),
    };
    let mut stack: Vec<(char, usize, usize)> = Vec::new();
    let mut string: Option<OpenString> = None;
    let mut logical: Option<Logical> = None;
    let mut pending: Vec<PendingColon> = Vec::new();

    for (idx, raw) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let chars: Vec<char> = raw.as_ref().chars().collect();
        let mut state = LineState {
            depth_at_start: stack.len(),
            starts_in_string: string.is_some(),
            ends_in_string: false,
        };
        let mut continued = false;
        let mut escaped_newline = false;
        let mut j = 0;

        while j < chars.len() {
            let c = chars[j];

            if let Some(open) = &string {
                if c == '\\' {
                    if j + 1 >= chars.len() {
                        escaped_newline = true;
                    }
                    j += 2;
                    continue;
                }
                if c == open.quote {
                    if !open.triple {
                        string = None;
                        if let Some(l) = logical.as_mut() {
                            l.last_line = line_no;
                            l.last_end = j + 1;
                        }
                        j += 1;
                        continue;
                    }
                    if chars.get(j + 1) == Some(&c) && chars.get(j + 2) == Some(&c) {
                        string = None;
                        if let Some(l) = logical.as_mut() {
                            l.last_line = line_no;
                            l.last_end = j + 3;
                        }
                        j += 3;
                        continue;
                    }
                }
                j += 1;
                continue;
            }

            if c.is_whitespace() {
                j += 1;
                continue;
            }
            if c == '#' {
                break;
            }
            if c == '\\' && j + 1 == chars.len() {
                continued = true;
                break;
            }

            if logical.is_none() {
                logical = Some(Logical {
                    start: line_no,
                    keyword: leading_keyword(&chars, j),
                    colon_at_depth0: false,
                    last_line: line_no,
                    last_end: j,
                });
            }
            if let Some(l) = logical.as_mut() {
                l.last_line = line_no;
                l.last_end = j + 1;
            }

            match c {
                '"' | '\'' => {
                    let triple = chars.get(j + 1) == Some(&c) && chars.get(j + 2) == Some(&c);
                    string = Some(OpenString {
                        quote: c,
                        triple,
                        line: line_no,
                        column: j,
                    });
                    j += if triple { 3 } else { 1 };
                    continue;
                }
                '(' | '[' | '{' => stack.push((c, line_no, j)),
                ')' | ']' | '}' => match stack.pop() {
                    None => result.issues.push(LexicalIssue::UnmatchedCloser {
                        line: line_no,
                        column: j,
                        found: c,
                    }),
                    Some((open, _, _)) if closer_for(open) != c => {
                        result.issues.push(LexicalIssue::MismatchedCloser {
                            line: line_no,
                            column: j,
                            expected: closer_for(open),
                            found: c,
                        })
                    }
                    Some(_) => {}
                },
                ':' if stack.is_empty() && chars.get(j + 1) != Some(&'=') => {
                    if let Some(l) = logical.as_mut() {
                        l.colon_at_depth0 = true;
                    }
                }
                _ => {}
            }
            j += 1;
        }

        // A single-quoted string cannot cross a newline unless escaped
        if let Some(open) = &string {
            if !open.triple && !escaped_newline {
                result.issues.push(LexicalIssue::UnterminatedString {
                    line: open.line,
                    column: open.column,
                    delimiter: open.quote.to_string(),
                    triple: false,
                    end_line: line_no,
                    end_column: chars.len(),
                });
                string = None;
                if let Some(l) = logical.as_mut() {
                    l.last_line = line_no;
                    l.last_end = chars.len();
                }
            }
        }

        state.ends_in_string = string.is_some();
        result.lines.push(state);

        if string.is_none() && stack.is_empty() && !continued {
            if let Some(done) = logical.take() {
                close_logical(done, &mut result.issues, &mut pending);
            }
        }
    }

    if let Some(open) = string.take() {
        let delimiter = if open.triple {
            open.quote.to_string().repeat(3)
        } else {
            open.quote.to_string()
        };
        let end_column = lines
            .last()
            .map(|l| l.as_ref().chars().count())
            .unwrap_or(0);
        result.issues.push(LexicalIssue::UnterminatedString {
            line: open.line,
            column: open.column,
            delimiter,
            triple: open.triple,
            end_line: lines.len(),
            end_column,
        });
    }
    for (open, line, column) in stack.drain(..) {
        result
            .issues
            .push(LexicalIssue::UnclosedBracket { line, column, open });
    }
    if !result.has_hard_errors() {
        if let Some(done) = logical.take() {
            close_logical(done, &mut result.issues, &mut pending);
        }
    }

    resolve_pending(lines, &result.lines, &mut result.issues, pending);
    result.issues.sort_by_key(LexicalIssue::line);
    result
}

fn close_logical(done: Logical, issues: &mut Vec<LexicalIssue>, pending: &mut Vec<PendingColon>) {
    let Some(keyword) = done.keyword else {
        return;
    };
    if done.colon_at_depth0 {
        return;
    }
    pending.push(PendingColon {
        issue: issues.len(),
        start: done.start,
        end: done.last_line,
    });
    issues.push(LexicalIssue::MissingColon {
        line: done.last_line,
        column: done.last_end,
        keyword,
        unambiguous: false,
    });
}

/// A missing colon is only safe to insert when the header is a single line
/// and the following code line opens a deeper block.
fn resolve_pending<S: AsRef<str>>(
    lines: &[S],
    states: &[LineState],
    issues: &mut [LexicalIssue],
    pending: Vec<PendingColon>,
) {
    for p in pending {
        if p.start != p.end {
            continue;
        }
        let header_width = indent_width(indentation(lines[p.start - 1].as_ref()), 8);
        let next = lines
            .iter()
            .enumerate()
            .skip(p.end)
            .find(|(i, l)| {
                let t = l.as_ref().trim();
                !t.is_empty() && !t.starts_with('#') && !states[*i].starts_in_string
            })
            .map(|(_, l)| indent_width(indentation(l.as_ref()), 8));

        if let (Some(width), Some(LexicalIssue::MissingColon { unambiguous, .. })) =
            (next, issues.get_mut(p.issue))
        {
            *unambiguous = width > header_width;
        }
    }
}

/// Character offsets after which a line can be split without changing its
/// meaning: after a comma or an opening bracket while inside brackets, and
/// outside strings and comments. Offsets that would leave nothing but a
/// comment or whitespace on the continuation line are dropped.
pub fn break_points(line: &str, depth_at_start: usize) -> Vec<usize> {
    let chars: Vec<char> = line.chars().collect();
    let mut depth = depth_at_start;
    let mut points = Vec::new();
    let mut code_end = chars.len();
    let mut j = 0;

    while j < chars.len() {
        let c = chars[j];
        match c {
            '#' => {
                code_end = j;
                break;
            }
            '"' | '\'' => {
                let triple = chars.get(j + 1) == Some(&c) && chars.get(j + 2) == Some(&c);
                let width = if triple { 3 } else { 1 };
                let mut k = j + width;
                let mut closed = None;
                while k < chars.len() {
                    if chars[k] == '\\' {
                        k += 2;
                        continue;
                    }
                    if chars[k] == c
                        && (!triple
                            || (chars.get(k + 1) == Some(&c) && chars.get(k + 2) == Some(&c)))
                    {
                        closed = Some(k + width);
                        break;
                    }
                    k += 1;
                }
                match closed {
                    Some(next) => {
                        j = next;
                        continue;
                    }
                    None => {
                        code_end = j;
                        break;
                    }
                }
            }
            '(' | '[' | '{' => {
                depth += 1;
                points.push(j + 1);
            }
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth > 0 => points.push(j + 1),
            _ => {}
        }
        j += 1;
    }

    points.retain(|&p| chars[p..code_end].iter().any(|c| !c.is_whitespace()));
    points
}
