//! Healing transformer
//!
//! Turns a prioritized list of fixable gaps into concrete, validated edits.
//! Every fix is mechanical and local: it never deletes code and never
//! renames anything.
//!
//! Edits are applied bottom-up (descending anchor line) so that an edit
//! never shifts the line numbers of edits still to come. The whole batch is
//! then re-checked structurally and thrown away if it made things worse.

mod line_break;
mod rules;

pub use line_break::break_line;

use crate::config::DetectionConfig;
use crate::detectors::structural_check;
use crate::models::Gap;
use crate::parsers::lexical;
use crate::parsers::SourceLines;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashSet;
use tracing::debug;

/// What happened to one gap in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum FixOutcome {
    Applied,
    /// Not attempted; may succeed in a later tick
    Skipped(String),
    /// Attempted and failed, or rolled back with its batch
    Failed(String),
}

impl FixOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, FixOutcome::Applied)
    }
}

/// Result of one transformer run
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub source: String,
    /// One outcome per input gap, in input order
    pub outcomes: Vec<FixOutcome>,
    /// The batch broke the structure and was discarded
    pub rejected: bool,
}

impl TransformResult {
    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_applied()).count()
    }
}

/// Applies fixes according to a detection configuration
pub struct HealingTransformer<'a> {
    config: &'a DetectionConfig,
}

impl<'a> HealingTransformer<'a> {
    pub fn new(config: &'a DetectionConfig) -> Self {
        Self { config }
    }

    pub fn transform(&self, source: &str, gaps: &[Gap]) -> TransformResult {
        let mut lines = SourceLines::split(source);
        let scan = lexical::scan(&lines.lines);
        let mut outcomes = vec![FixOutcome::Skipped("not attempted".to_string()); gaps.len()];
        let mut reshaped: HashSet<usize> = HashSet::new();

        for idx in edit_order(gaps) {
            let gap = &gaps[idx];
            if !gap.fixable {
                outcomes[idx] = FixOutcome::Skipped("gap is not fixable".to_string());
                continue;
            }
            let anchor = gap.location.anchor_line();
            if gap.kind.reshapes_lines() && reshaped.contains(&anchor) {
                outcomes[idx] =
                    FixOutcome::Skipped(format!("line {anchor} already reshaped in this batch"));
                continue;
            }

            let outcome = rules::apply(gap, &mut lines.lines, &scan, self.config);
            if outcome.is_applied() && gap.kind.reshapes_lines() {
                reshaped.insert(anchor);
            }
            outcomes[idx] = outcome;
        }

        if !outcomes.iter().any(FixOutcome::is_applied) {
            return TransformResult {
                source: source.to_string(),
                outcomes,
                rejected: false,
            };
        }

        let healed = lines.join();
        let before = structural_check(source);
        let after = structural_check(&healed);
        let broke = before.valid && !after.valid;
        if broke || after.error_count > before.error_count {
            debug!(
                "Rejecting batch of {} edit(s): structural errors {} -> {}",
                outcomes.iter().filter(|o| o.is_applied()).count(),
                before.error_count,
                after.error_count
            );
            let reason = format!(
                "batch rejected: structural errors {} -> {}",
                before.error_count, after.error_count
            );
            return TransformResult {
                source: source.to_string(),
                outcomes: vec![FixOutcome::Failed(reason); gaps.len()],
                rejected: true,
            };
        }

        TransformResult {
            source: healed,
            outcomes,
            rejected: false,
        }
    }
}

/// Bottom-up order: descending anchor line; on one line, edits that keep
/// the line count first, then dimension priority, severity, column.
fn edit_order(gaps: &[Gap]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..gaps.len()).collect();
    order.sort_by(|&a, &b| {
        let (ga, gb) = (&gaps[a], &gaps[b]);
        Reverse(ga.location.anchor_line())
            .cmp(&Reverse(gb.location.anchor_line()))
            .then_with(|| ga.kind.reshapes_lines().cmp(&gb.kind.reshapes_lines()))
            .then_with(|| ga.dimension.priority().cmp(&gb.dimension.priority()))
            .then_with(|| gb.severity.total_cmp(&ga.severity))
            .then_with(|| Reverse(ga.location.column).cmp(&Reverse(gb.location.column)))
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::analyze;
    use crate::models::{GapKind, Location};

    fn heal_once(src: &str) -> TransformResult {
        let config = DetectionConfig::default();
        let report = analyze(src, None, &config);
        let fixable: Vec<Gap> = report.gaps.into_iter().filter(|g| g.fixable).collect();
        HealingTransformer::new(&config).transform(src, &fixable)
    }

    #[test]
    fn test_trailing_whitespace_and_broad_except() {
        let src = "try:   \n    x = 1\nexcept:  \n    x = 0\n";
        let result = heal_once(src);
        assert!(!result.rejected);
        assert_eq!(
            result.source,
            "try:\n    x = 1\nexcept Exception:\n    x = 0\n"
        );
        assert_eq!(result.applied_count(), 3);
    }

    #[test]
    fn test_docblock_inserted_after_multiline_header() {
        let src = "def f(\n    a,\n):\n    return a\n";
        let result = heal_once(src);
        assert_eq!(
            result.source,
            "def f(\n    a,\n):\n    \"\"\"Add documentation.\"\"\"\n    return a\n"
        );
    }

    #[test]
    fn test_unused_import_commented_not_deleted() {
        let src = "from typing import (\n    List,\n    Dict,\n)\nimport os\nx = 1\n";
        let result = heal_once(src);
        assert_eq!(
            result.source,
            "# from typing import (\n    # List,\n    # Dict,\n# )\n# import os\nx = 1\n"
        );
        assert_eq!(result.applied_count(), 3);
    }

    #[test]
    fn test_crlf_preserved() {
        let src = "x = 1  \r\ny = 2\r\n";
        let result = heal_once(src);
        assert_eq!(result.source, "x = 1\r\ny = 2\r\n");
    }

    #[test]
    fn test_missing_colon_and_unclosed_literal() {
        assert_eq!(
            heal_once("def f(x)\n    return x\n").source,
            "def f(x):\n    return x\n"
        );
        assert_eq!(heal_once("x = 'abc\n").source, "x = 'abc'\n");
    }

    #[test]
    fn test_one_reshaping_edit_per_line() {
        let config = DetectionConfig::default();
        let src = "def f():\n    return 1\n";
        let doc = Gap::new(GapKind::MissingDocBlock, 0.4, Location::new(1, 0), "doc")
            .fixable(true)
            .with_hint(crate::models::FixHint::DocBlock {
                indent: "    ".into(),
            });
        let result = HealingTransformer::new(&config).transform(src, &[doc.clone(), doc]);
        assert_eq!(result.outcomes[0], FixOutcome::Applied);
        assert!(matches!(result.outcomes[1], FixOutcome::Skipped(_)));
        assert_eq!(result.source.matches("\"\"\"").count(), 2);
    }

    #[test]
    fn test_manual_kinds_skipped() {
        let config = DetectionConfig::default();
        let src = "def getValue():\n    'doc'\n";
        let naming = Gap::new(
            GapKind::NamingConventionViolation,
            0.3,
            Location::new(1, 0),
            "name",
        )
        .fixable(true);
        let result = HealingTransformer::new(&config).transform(src, &[naming]);
        assert!(matches!(result.outcomes[0], FixOutcome::Skipped(_)));
        assert_eq!(result.source, src);
    }

    #[test]
    fn test_batch_that_breaks_structure_is_rejected() {
        let config = DetectionConfig::default();
        let src = "x = 1\n";
        // inserting an unmatched quote into valid code must be rolled back
        let bogus = Gap::new(GapKind::UnclosedLiteral, 1.0, Location::new(1, 0), "bogus")
            .fixable(true)
            .with_hint(crate::models::FixHint::Insert {
                column: 5,
                text: "'".into(),
            });
        let result = HealingTransformer::new(&config).transform(src, &[bogus]);
        assert!(result.rejected);
        assert_eq!(result.source, src);
        assert!(matches!(result.outcomes[0], FixOutcome::Failed(_)));
    }

    #[test]
    fn test_long_line_split() {
        let args: Vec<String> = (0..12).map(|i| format!("argument_{i}")).collect();
        let src = format!("result = compute({})\n", args.join(", "));
        let result = heal_once(&src);
        assert!(!result.rejected);
        let lines: Vec<&str> = result.source.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].chars().count() <= 100);
        assert!(lines[1].starts_with("    "));
        assert_eq!(
            result.source.replace('\n', "").replace("    ", " ").replace(",  ", ", "),
            src.trim_end().to_string()
        );
    }

    #[test]
    fn test_mixed_indentation_expanded() {
        let src = "def f():\n    'doc'\n    return 1\n\ndef g():\n\t'doc'\n\treturn 2\n";
        let result = heal_once(src);
        assert_eq!(
            result.source,
            "def f():\n    'doc'\n    return 1\n\ndef g():\n        'doc'\n        return 2\n"
        );
    }

    #[test]
    fn test_edit_order_bottom_up() {
        let gaps = vec![
            Gap::new(GapKind::TrailingWhitespace, 0.1, Location::new(1, 0), "a"),
            Gap::new(GapKind::MissingDocBlock, 0.4, Location::spanning(2, 0, 5), "b"),
            Gap::new(GapKind::LineTooLong, 0.2, Location::new(5, 0), "c"),
            Gap::new(GapKind::TrailingWhitespace, 0.1, Location::new(5, 0), "d"),
        ];
        let order = edit_order(&gaps);
        // line 5: keep-shape edit first, then the two reshaping edits (Love before Wisdom)
        assert_eq!(order, vec![3, 2, 1, 0]);
    }
}
