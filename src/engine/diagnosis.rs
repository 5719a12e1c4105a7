//! Read-only summary of a source text

use crate::config::HealConfig;
use crate::detectors::GapDetector;
use crate::models::{Dimension, Gap};
use crate::scoring::{HarmonyScorer, Phase, QualityVector};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnosis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub gaps: Vec<Gap>,
    pub vector: QualityVector,
    pub harmony: f64,
    pub gap_from_anchor: f64,
    pub fuel_level: f64,
    /// Summed severity of every gap
    pub fuel_available: f64,
    pub phase: Phase,
    pub consciousness: f64,
    pub conscious: bool,
    pub viable: bool,
    pub counts: BTreeMap<Dimension, usize>,
    pub fixable_count: usize,
    pub line_count: usize,
    pub complete: bool,
}

impl Diagnosis {
    pub fn manual_count(&self) -> usize {
        self.gaps.len() - self.fixable_count
    }
}

/// Detect and score without changing anything
pub fn diagnose(source: &str, filename: Option<&str>, config: &HealConfig) -> Diagnosis {
    let report = GapDetector::new().analyze(source, filename, &config.detection);
    let vector = HarmonyScorer::new(&config.scoring).score(&report.gaps, report.line_count);
    let counts = Dimension::ALL
        .iter()
        .map(|d| (*d, report.count_in(*d)))
        .collect();

    Diagnosis {
        fuel_available: report.total_severity(),
        fixable_count: report.fixable_count(),
        line_count: report.line_count,
        complete: report.complete,
        file: report.file,
        gaps: report.gaps,
        harmony: vector.harmony(),
        gap_from_anchor: vector.gap_from_anchor(),
        fuel_level: vector.fuel_level(),
        phase: vector.phase(),
        consciousness: vector.consciousness(),
        conscious: vector.is_conscious(),
        viable: vector.viable(),
        vector,
        counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnose_counts_per_dimension() {
        let src = "import os\n\ndef getValue():\n    try:\n        pass\n    except:\n        pass\n";
        let d = diagnose(src, Some("demo.py"), &HealConfig::default());
        assert_eq!(d.file.as_deref(), Some("demo.py"));
        assert_eq!(d.counts[&Dimension::Power], 0);
        assert_eq!(d.counts[&Dimension::Justice], 1);
        assert_eq!(d.counts[&Dimension::Love], 1);
        assert_eq!(d.counts[&Dimension::Wisdom], 2);
        assert_eq!(d.fixable_count, 3);
        assert_eq!(d.manual_count(), 1);
        assert!(d.complete);
        assert!(d.viable);
        // naming 0.3, unused import 0.3, doc block 0.4, bare except 0.7
        assert!((d.fuel_available - 1.7).abs() < 1e-9);
    }

    #[test]
    fn test_diagnose_blank_source() {
        let d = diagnose("   \n\t\n  ", None, &HealConfig::default());
        assert!(d.gaps.is_empty());
        assert_eq!(d.gap_from_anchor, 0.0);
        assert_eq!(d.fuel_available, 0.0);
        assert_eq!(d.phase, Phase::Autopoietic);
    }
}
