//! Missing Docstrings Detector
//!
//! Reports functions and classes whose body does not open with a string
//! literal. The gap spans the whole header so that the doc block can be
//! inserted right after the header's last line.

use crate::detectors::base::{DetectionContext, Detector};
use crate::models::{Dimension, FixHint, Gap, GapKind, Location};
use crate::parsers::python::DefinitionKind;

pub struct MissingDocstringsDetector;

impl MissingDocstringsDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MissingDocstringsDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for MissingDocstringsDetector {
    fn name(&self) -> &'static str {
        "missing-doc-block"
    }

    fn description(&self) -> &'static str {
        "Detects functions and classes without a docstring"
    }

    fn dimension(&self) -> Dimension {
        Dimension::Wisdom
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Gap> {
        let Some(module) = ctx.module else {
            return Vec::new();
        };

        module
            .definitions
            .iter()
            .filter(|d| !d.has_docstring)
            .map(|d| {
                let what = match d.kind {
                    DefinitionKind::Function => "Function",
                    DefinitionKind::Class => "Class",
                };
                // `def f(): pass` has no line to put a doc block on
                let own_body_line = d.body_line > d.header_end_line;
                let gap = ctx
                    .gap(
                        GapKind::MissingDocBlock,
                        Location::spanning(d.line, d.column, d.header_end_line),
                        format!("{what} '{}' has no docstring", d.name),
                    )
                    .fixable(own_body_line);
                if own_body_line {
                    gap.with_hint(FixHint::DocBlock {
                        indent: d.body_indent.clone(),
                    })
                } else {
                    gap
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::DetectionConfig;
    use crate::detectors::analyze;
    use crate::models::{FixHint, Gap, GapKind};

    fn missing(src: &str) -> Vec<Gap> {
        analyze(src, None, &DetectionConfig::default())
            .gaps
            .into_iter()
            .filter(|g| g.kind == GapKind::MissingDocBlock)
            .collect()
    }

    #[test]
    fn test_documented_definitions_are_clean() {
        let src = "class A:\n    \"\"\"A thing.\"\"\"\n\n    def run(self):\n        '''Run it.'''\n        return 1\n";
        assert!(missing(src).is_empty());
    }

    #[test]
    fn test_missing_doc_hint_uses_body_indent() {
        let gaps = missing("class A:\n    def run(self):\n        return 1\n");
        assert_eq!(gaps.len(), 2);
        assert_eq!(
            gaps[1].hint,
            Some(FixHint::DocBlock {
                indent: "        ".into()
            })
        );
        assert!(gaps.iter().all(|g| g.fixable));
    }

    #[test]
    fn test_multiline_header_anchor() {
        let gaps = missing("def f(\n    a,\n):\n    return a\n");
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].location.line, 1);
        assert_eq!(gaps[0].location.end_line, Some(3));
    }

    #[test]
    fn test_inline_body_not_fixable() {
        let gaps = missing("def f(): return 1\n");
        assert_eq!(gaps.len(), 1);
        assert!(!gaps[0].fixable);
        assert!(gaps[0].hint.is_none());
    }

    #[test]
    fn test_non_string_first_statement_is_not_a_docstring() {
        let gaps = missing("def f():\n    x = 'not a doc'\n    return x\n");
        assert_eq!(gaps.len(), 1);
    }
}
