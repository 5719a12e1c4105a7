//! Structural validity detector (Power)
//!
//! Explains why a source text does not parse. Every gap is best-effort:
//! after the first structural error the parser's view of the rest of the
//! file is unreliable, so lexical evidence is preferred where it exists.

use crate::detectors::base::{DetectionContext, Detector};
use crate::models::{Dimension, FixHint, Gap, GapKind, Location};
use crate::parsers::lexical::LexicalIssue;

pub struct StructureDetector;

impl StructureDetector {
    pub fn new() -> Self {
        Self
    }

    /// The source is structurally invalid
    pub fn is_invalid(ctx: &DetectionContext) -> bool {
        ctx.lexical.has_hard_errors() || ctx.module.map_or(true, |m| m.has_error)
    }

    fn issue_gap(ctx: &DetectionContext, issue: &LexicalIssue) -> Gap {
        match issue {
            LexicalIssue::UnterminatedString {
                line,
                column,
                delimiter,
                triple: false,
                end_line,
                end_column,
            } if end_line != line => ctx
                .gap(
                    GapKind::UnclosedLiteral,
                    // the quote goes where the continued literal stops
                    Location::new(*end_line, *end_column),
                    format!(
                        "String literal opened with {delimiter} on line {line} is never closed"
                    ),
                )
                .fixable(true)
                .with_hint(FixHint::Insert {
                    column: *end_column,
                    text: delimiter.clone(),
                }),
            LexicalIssue::UnterminatedString {
                line,
                column,
                delimiter,
                triple: false,
                end_column,
                ..
            } => ctx
                .gap(
                    GapKind::UnclosedLiteral,
                    Location::new(*line, *column),
                    format!("String literal opened with {delimiter} is never closed"),
                )
                .fixable(true)
                .with_hint(FixHint::Insert {
                    column: *end_column,
                    text: delimiter.clone(),
                }),
            LexicalIssue::UnterminatedString {
                line,
                column,
                delimiter,
                triple: true,
                ..
            } => ctx.gap(
                GapKind::UnclosedLiteral,
                Location::new(*line, *column),
                format!("Triple-quoted string opened with {delimiter} runs to end of file"),
            ),
            LexicalIssue::UnmatchedCloser {
                line,
                column,
                found,
            } => ctx.gap(
                GapKind::UnbalancedBracket,
                Location::new(*line, *column),
                format!("Closing '{found}' has no matching opener"),
            ),
            LexicalIssue::MismatchedCloser {
                line,
                column,
                expected,
                found,
            } => ctx.gap(
                GapKind::UnbalancedBracket,
                Location::new(*line, *column),
                format!("Expected '{expected}' but found '{found}'"),
            ),
            LexicalIssue::UnclosedBracket { line, column, open } => ctx.gap(
                GapKind::UnbalancedBracket,
                Location::new(*line, *column),
                format!("'{open}' is never closed"),
            ),
            LexicalIssue::MissingColon {
                line,
                column,
                keyword,
                unambiguous,
            } => {
                let gap = ctx
                    .gap(
                        GapKind::MissingBlockTerminator,
                        Location::new(*line, *column),
                        format!("'{keyword}' statement is missing its ':'"),
                    )
                    .fixable(*unambiguous);
                if *unambiguous {
                    gap.with_hint(FixHint::Insert {
                        column: *column,
                        text: ":".to_string(),
                    })
                } else {
                    gap
                }
            }
        }
    }
}

impl Default for StructureDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for StructureDetector {
    fn name(&self) -> &'static str {
        "structure"
    }

    fn description(&self) -> &'static str {
        "Detects unclosed literals, unbalanced brackets and malformed block headers"
    }

    fn dimension(&self) -> Dimension {
        Dimension::Power
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Gap> {
        if !Self::is_invalid(ctx) {
            return Vec::new();
        }

        let mut gaps: Vec<Gap> = ctx
            .lexical
            .issues
            .iter()
            .map(|issue| Self::issue_gap(ctx, issue).best_effort())
            .collect();

        if gaps.is_empty() {
            let (line, column) = ctx
                .module
                .and_then(|m| m.first_error)
                .unwrap_or((1, 0));
            let description = if ctx.module.is_some() {
                "Syntax error the scanner cannot classify"
            } else {
                "Source could not be parsed"
            };
            gaps.push(
                ctx.gap(GapKind::SyntaxError, Location::new(line, column), description)
                    .best_effort(),
            );
        }
        gaps
    }
}

#[cfg(test)]
mod tests {
    use crate::config::DetectionConfig;
    use crate::detectors::analyze;
    use crate::models::{Confidence, FixHint, GapKind};

    #[test]
    fn test_unclosed_string_is_fixable() {
        let report = analyze("x = 'abc\n", None, &DetectionConfig::default());
        assert!(!report.complete);
        assert_eq!(report.gaps.len(), 1);
        let gap = &report.gaps[0];
        assert_eq!(gap.kind, GapKind::UnclosedLiteral);
        assert!(gap.fixable);
        assert_eq!(gap.confidence, Confidence::BestEffort);
        assert_eq!(
            gap.hint,
            Some(FixHint::Insert {
                column: 8,
                text: "'".into()
            })
        );
    }

    #[test]
    fn test_continued_string_closed_where_it_stops() {
        let report = analyze("x = 'abcdefghijkl\\\nmn\ny = 1\n", None, &DetectionConfig::default());
        let gap = &report.gaps[0];
        assert_eq!(gap.kind, GapKind::UnclosedLiteral);
        assert_eq!(gap.location.line, 2);
        assert_eq!(
            gap.hint,
            Some(FixHint::Insert {
                column: 2,
                text: "'".into()
            })
        );
    }

    #[test]
    fn test_comment_only_block_is_a_syntax_error() {
        let report = analyze(
            "try:\n    # import a\nexcept ImportError:\n    pass\n",
            None,
            &DetectionConfig::default(),
        );
        assert!(!report.complete);
        assert_eq!(report.gaps.len(), 1);
        assert_eq!(report.gaps[0].kind, GapKind::SyntaxError);
        assert_eq!(report.gaps[0].location.line, 1);
    }

    #[test]
    fn test_missing_colon_fixable_when_unambiguous() {
        let report = analyze("def f(x)\n    return x\n", None, &DetectionConfig::default());
        assert!(!report.complete);
        assert_eq!(report.gaps.len(), 1);
        assert_eq!(report.gaps[0].kind, GapKind::MissingBlockTerminator);
        assert!(report.gaps[0].fixable);
    }

    #[test]
    fn test_unbalanced_bracket_not_fixable() {
        let report = analyze("x = [1, 2\ny = 3\n", None, &DetectionConfig::default());
        assert!(!report.complete);
        assert!(report
            .gaps
            .iter()
            .all(|g| g.kind == GapKind::UnbalancedBracket && !g.fixable));
    }

    #[test]
    fn test_unclassified_error_becomes_syntax_error() {
        let report = analyze("x = = 1\n", None, &DetectionConfig::default());
        assert!(!report.complete);
        assert_eq!(report.gaps.len(), 1);
        assert_eq!(report.gaps[0].kind, GapKind::SyntaxError);
        assert!(!report.gaps[0].fixable);
    }

    #[test]
    fn test_invalid_source_reports_power_only() {
        // the missing doc block and bad name would be reported on valid input
        let report = analyze(
            "def BadName(x)\n    return x  \n",
            None,
            &DetectionConfig::default(),
        );
        assert!(report.gaps.iter().all(|g| g.kind.dimension() == crate::models::Dimension::Power));
    }
}
