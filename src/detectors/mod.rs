//! Gap detectors
//!
//! This module turns raw source text into a `GapReport`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       GapDetector                           │
//! │  - Splits lines, runs the lexical scanner and tree-sitter   │
//! │  - Runs the structure detector first                        │
//! │  - Stops with Power-only gaps when the source is invalid    │
//! │  - Otherwise runs every registered detector                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Detector Trait                         │
//! │  - name(): Unique identifier                                │
//! │  - dimension(): Power / Justice / Love / Wisdom             │
//! │  - detect(ctx): Return gaps                                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Detectors
//!
//! - `StructureDetector` - unclosed literals, brackets, missing `:` (Power)
//! - `NamingDetector`, `ComplexityDetector` (Justice)
//! - `TrailingWhitespaceDetector`, `LongLineDetector`,
//!   `MixedIndentationDetector`, `UnusedImportsDetector` (Love)
//! - `MissingDocstringsDetector`, `BroadExceptionDetector` (Wisdom)
//!
//! # Usage
//!
//! ```ignore
//! use harmony_heal::config::DetectionConfig;
//! use harmony_heal::detectors::analyze;
//!
//! let report = analyze("import os\n", Some("demo.py"), &DetectionConfig::default());
//! assert_eq!(report.gaps.len(), 1);
//! ```

mod base;
mod broad_exception;
mod hygiene;
mod missing_docstrings;
mod naming;
mod structure;
mod unused_imports;

pub use base::{DetectionContext, Detector};
pub use broad_exception::BroadExceptionDetector;
pub use hygiene::{LongLineDetector, MixedIndentationDetector, TrailingWhitespaceDetector};
pub use missing_docstrings::MissingDocstringsDetector;
pub use naming::{to_pascal_case, to_snake_case, ComplexityDetector, NamingDetector};
pub use structure::StructureDetector;
pub use unused_imports::UnusedImportsDetector;

use crate::config::DetectionConfig;
use crate::models::GapReport;
use crate::parsers::{self, lexical, python, SourceLines};
use std::sync::Arc;
use tracing::debug;

/// Create the default set of detectors run on structurally valid source
pub fn default_detectors() -> Vec<Arc<dyn Detector>> {
    vec![
        // Justice
        Arc::new(NamingDetector::new()),
        Arc::new(ComplexityDetector::new()),
        // Love
        Arc::new(TrailingWhitespaceDetector::new()),
        Arc::new(LongLineDetector::new()),
        Arc::new(MixedIndentationDetector::new()),
        Arc::new(UnusedImportsDetector::new()),
        // Wisdom
        Arc::new(MissingDocstringsDetector::new()),
        Arc::new(BroadExceptionDetector::new()),
    ]
}

/// Runs the structure check, then the registered detectors
pub struct GapDetector {
    structure: StructureDetector,
    detectors: Vec<Arc<dyn Detector>>,
}

impl Default for GapDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl GapDetector {
    pub fn new() -> Self {
        Self::with_detectors(default_detectors())
    }

    pub fn with_detectors(detectors: Vec<Arc<dyn Detector>>) -> Self {
        Self {
            structure: StructureDetector::new(),
            detectors,
        }
    }

    pub fn detectors(&self) -> &[Arc<dyn Detector>] {
        &self.detectors
    }

    /// Detect gaps in one source text. Never fails.
    pub fn analyze(
        &self,
        source: &str,
        filename: Option<&str>,
        config: &DetectionConfig,
    ) -> GapReport {
        let lines = SourceLines::split(source);
        let mut report = GapReport {
            file: filename.map(str::to_string),
            gaps: Vec::new(),
            line_count: lines.len(),
            complete: true,
        };
        if parsers::is_inert(source) {
            return report;
        }

        let lexical = lexical::scan(&lines.lines);
        let module = python::parse_module(source);
        let ctx = DetectionContext {
            source,
            lines: &lines,
            lexical: &lexical,
            module: module.as_ref(),
            config,
        };

        let power = self.structure.detect(&ctx);
        if !power.is_empty() {
            debug!(
                "{}: structurally invalid, {} power gap(s)",
                filename.unwrap_or("<source>"),
                power.len()
            );
            report.gaps = power;
            report.complete = false;
            sort_gaps(&mut report);
            return report;
        }

        for detector in &self.detectors {
            let found = detector.detect(&ctx);
            debug_assert!(found.iter().all(|g| g.dimension == detector.dimension()));
            report.gaps.extend(found);
        }
        sort_gaps(&mut report);
        report
    }
}

/// Dimensions in priority order, ascending location within a dimension
fn sort_gaps(report: &mut GapReport) {
    report
        .gaps
        .sort_by(|a, b| {
            a.dimension
                .priority()
                .cmp(&b.dimension.priority())
                .then_with(|| a.location.cmp(&b.location))
        });
}

/// Detect gaps with the default detector set
pub fn analyze(source: &str, filename: Option<&str>, config: &DetectionConfig) -> GapReport {
    GapDetector::new().analyze(source, filename, config)
}

/// Structural validity of a source text, used to validate edit batches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuralCheck {
    pub valid: bool,
    pub error_count: usize,
}

pub fn structural_check(source: &str) -> StructuralCheck {
    let lines = SourceLines::split(source);
    let lexical = lexical::scan(&lines.lines);
    // an unavailable parser counts as one error
    let tree_errors = python::error_count(source).unwrap_or(1);
    let error_count = tree_errors + lexical.hard_error_count();
    StructuralCheck {
        valid: error_count == 0,
        error_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dimension, GapKind};

    #[test]
    fn test_inert_sources_have_no_gaps() {
        let config = DetectionConfig::default();
        for src in ["", "   \n\t\n  ", "# only a comment   \n\n# another\n"] {
            let report = analyze(src, None, &config);
            assert!(report.gaps.is_empty(), "{src:?}");
            assert!(report.complete);
        }
    }

    #[test]
    fn test_gaps_sorted_by_dimension_then_location() {
        let src = "import os\n\ndef getThing():  \n    try:\n        return 1\n    except:\n        return 2\n";
        let report = analyze(src, Some("demo.py"), &DetectionConfig::default());
        assert!(report.complete);
        assert_eq!(report.file.as_deref(), Some("demo.py"));

        let dims: Vec<_> = report.gaps.iter().map(|g| g.dimension).collect();
        let mut sorted = dims.clone();
        sorted.sort_by_key(|d| d.priority());
        assert_eq!(dims, sorted);

        let kinds: Vec<_> = report.gaps.iter().map(|g| g.kind).collect();
        assert_eq!(
            kinds,
            vec![
                GapKind::NamingConventionViolation,
                GapKind::UnusedImport,
                GapKind::TrailingWhitespace,
                GapKind::MissingDocBlock,
                GapKind::BroadExceptionClause,
            ]
        );
        assert_eq!(report.count_in(Dimension::Wisdom), 2);
        assert_eq!(report.line_count, 7);
    }

    #[test]
    fn test_structural_check() {
        assert_eq!(
            structural_check("x = 1\n"),
            StructuralCheck {
                valid: true,
                error_count: 0
            }
        );
        let broken = structural_check("x = (1\n");
        assert!(!broken.valid);
        assert!(broken.error_count >= 2);
        assert!(structural_check("").valid);
    }

    #[test]
    fn test_detector_registry() {
        let detector = GapDetector::new();
        let names: Vec<_> = detector.detectors().iter().map(|d| d.name()).collect();
        assert!(names.contains(&"unused-import"));
        assert!(names.contains(&"broad-exception"));
        assert!(detector
            .detectors()
            .iter()
            .all(|d| d.dimension() != Dimension::Power));
    }
}
