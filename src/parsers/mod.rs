//! Source parsing for the gap detector
//!
//! - `python`: tree-sitter based module summary (definitions, imports,
//!   exception handlers, referenced names)
//! - `lexical`: hand-written scanner that keeps working on broken source

pub mod lexical;
pub mod python;

/// Physical lines of a source text plus the newline style needed to join
/// them back together unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLines {
    pub lines: Vec<String>,
    newline: &'static str,
    trailing_newline: bool,
}

impl SourceLines {
    pub fn split(source: &str) -> Self {
        let newline = if source.contains("\r\n") { "\r\n" } else { "\n" };
        if source.is_empty() {
            return Self {
                lines: Vec::new(),
                newline,
                trailing_newline: false,
            };
        }

        let trailing_newline = source.ends_with('\n');
        let body = if trailing_newline {
            &source[..source.len() - 1]
        } else {
            source
        };
        let lines = body
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();

        Self {
            lines,
            newline,
            trailing_newline,
        }
    }

    pub fn join(&self) -> String {
        let mut out = self.lines.join(self.newline);
        if self.trailing_newline {
            out.push_str(self.newline);
        }
        out
    }

    pub fn newline(&self) -> &'static str {
        self.newline
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 1-based access
    pub fn line(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .map(String::as_str)
    }
}

/// Leading whitespace of a line
pub fn indentation(line: &str) -> &str {
    let end = line.len() - line.trim_start_matches([' ', '\t', '\x0c']).len();
    &line[..end]
}

/// Width of an indentation string with tabs advancing to the next tab stop
pub fn indent_width(indent: &str, tab_size: usize) -> usize {
    indent.chars().fold(0, |col, c| match c {
        '\t' => (col / tab_size + 1) * tab_size,
        _ => col + 1,
    })
}

/// True when the text has nothing but blank lines and comments
pub fn is_inert(source: &str) -> bool {
    source
        .lines()
        .map(str::trim)
        .all(|l| l.is_empty() || l.starts_with('#'))
}
