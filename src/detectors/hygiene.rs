//! Surface hygiene detectors (Love)
//!
//! Line-oriented checks. Text that belongs to a multi-line string literal
//! is content, not layout: it is never reported for whitespace or
//! indentation, and long lines inside it are reported but left alone.

use crate::detectors::base::{DetectionContext, Detector};
use crate::models::{Dimension, Gap, GapKind, Location};
use crate::parsers::indentation;

pub struct TrailingWhitespaceDetector;

impl TrailingWhitespaceDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TrailingWhitespaceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for TrailingWhitespaceDetector {
    fn name(&self) -> &'static str {
        "trailing-whitespace"
    }

    fn description(&self) -> &'static str {
        "Detects whitespace at the end of non-blank lines"
    }

    fn dimension(&self) -> Dimension {
        Dimension::Love
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Gap> {
        let mut gaps = Vec::new();
        for (i, line) in ctx.lines.lines.iter().enumerate() {
            let trimmed = line.trim_end();
            if trimmed.is_empty() || trimmed.len() == line.len() {
                continue;
            }
            if ctx.lexical.state(i + 1).ends_in_string {
                continue;
            }
            gaps.push(
                ctx.gap(
                    GapKind::TrailingWhitespace,
                    Location::new(i + 1, trimmed.chars().count()),
                    "Trailing whitespace",
                )
                .fixable(true),
            );
        }
        gaps
    }
}

pub struct LongLineDetector;

impl LongLineDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LongLineDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for LongLineDetector {
    fn name(&self) -> &'static str {
        "line-too-long"
    }

    fn description(&self) -> &'static str {
        "Detects lines longer than the configured maximum"
    }

    fn dimension(&self) -> Dimension {
        Dimension::Love
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Gap> {
        let max = ctx.config.max_line_length;
        let mut gaps = Vec::new();
        for (i, line) in ctx.lines.lines.iter().enumerate() {
            let len = line.chars().count();
            if len <= max {
                continue;
            }
            let state = ctx.lexical.state(i + 1);
            let in_string = state.starts_in_string || state.ends_in_string;
            gaps.push(
                ctx.gap(
                    GapKind::LineTooLong,
                    Location::new(i + 1, max),
                    format!("Line too long ({len} > {max})"),
                )
                .fixable(!in_string),
            );
        }
        gaps
    }
}

pub struct MixedIndentationDetector;

impl MixedIndentationDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MixedIndentationDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for MixedIndentationDetector {
    fn name(&self) -> &'static str {
        "mixed-indentation"
    }

    fn description(&self) -> &'static str {
        "Detects tab indentation in files that also indent with spaces"
    }

    fn dimension(&self) -> Dimension {
        Dimension::Love
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Gap> {
        // (line number, indentation) of every code line
        let indents: Vec<(usize, &str)> = ctx
            .lines
            .lines
            .iter()
            .enumerate()
            .filter(|(i, line)| {
                !line.trim().is_empty() && !ctx.lexical.state(i + 1).starts_in_string
            })
            .map(|(i, line)| (i + 1, indentation(line)))
            .collect();

        let file_uses_spaces = indents
            .iter()
            .any(|(_, ind)| ind.contains(' ') && !ind.contains('\t'));

        indents
            .iter()
            .filter(|(_, ind)| ind.contains('\t') && (file_uses_spaces || ind.contains(' ')))
            .map(|(line, _)| {
                ctx.gap(
                    GapKind::MixedIndentation,
                    Location::new(*line, 0),
                    "Tab indentation mixed with spaces",
                )
                .fixable(true)
            })
            .collect()
    }
}
