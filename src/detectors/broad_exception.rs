//! Broad Exception Detector
//!
//! Bare `except:` also swallows `KeyboardInterrupt` and `SystemExit`.
//! Handlers that re-raise are left alone.

use crate::detectors::base::{DetectionContext, Detector};
use crate::models::{Dimension, Gap, GapKind, Location};

pub struct BroadExceptionDetector;

impl BroadExceptionDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BroadExceptionDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for BroadExceptionDetector {
    fn name(&self) -> &'static str {
        "broad-exception"
    }

    fn description(&self) -> &'static str {
        "Detects bare except clauses that swallow every exception"
    }

    fn dimension(&self) -> Dimension {
        Dimension::Wisdom
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Gap> {
        let Some(module) = ctx.module else {
            return Vec::new();
        };

        module
            .except_clauses
            .iter()
            .filter(|c| c.bare && !c.reraises)
            .map(|c| {
                ctx.gap(
                    GapKind::BroadExceptionClause,
                    Location::new(c.line, c.column),
                    "Bare 'except:' catches all exceptions including KeyboardInterrupt",
                )
                .fixable(true)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::DetectionConfig;
    use crate::detectors::analyze;
    use crate::models::GapKind;

    #[test]
    fn test_bare_except_detected() {
        let src = "try:\n    x = 1\nexcept:\n    x = 0\n";
        let report = analyze(src, None, &DetectionConfig::default());
        let broad: Vec<_> = report
            .gaps
            .iter()
            .filter(|g| g.kind == GapKind::BroadExceptionClause)
            .collect();
        assert_eq!(broad.len(), 1);
        assert_eq!(broad[0].location.line, 3);
        assert!(broad[0].fixable);
    }

    #[test]
    fn test_reraise_and_typed_handlers_ignored() {
        let src = "try:\n    x = 1\nexcept:\n    cleanup()\n    raise\n\ntry:\n    x = 1\nexcept (ValueError, TypeError):\n    pass\n";
        let report = analyze(src, None, &DetectionConfig::default());
        assert!(report
            .gaps
            .iter()
            .all(|g| g.kind != GapKind::BroadExceptionClause));
    }
}
