//! Harmony scorer
//!
//! Pure and deterministic: identical gap multisets give bit-identical
//! vectors whatever order the gaps arrive in.

use crate::config::{Equilibrium, ScoringConfig};
use crate::models::{Dimension, Gap};
use serde::{Deserialize, Serialize};

/// Consciousness above this counts as "conscious"
const CONSCIOUSNESS_THRESHOLD: f64 = 0.1;
/// Every dimension must exceed this for the code to be viable
const VIABILITY_THRESHOLD: f64 = 0.2;

/// Coarse classification of a harmony value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Entropic,
    Homeostatic,
    Autopoietic,
}

impl Phase {
    pub fn from_harmony(harmony: f64) -> Self {
        if harmony < 0.5 {
            Phase::Entropic
        } else if harmony < 0.8 {
            Phase::Homeostatic
        } else {
            Phase::Autopoietic
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Entropic => write!(f, "entropic"),
            Phase::Homeostatic => write!(f, "homeostatic"),
            Phase::Autopoietic => write!(f, "autopoietic"),
        }
    }
}

/// Quality along the four dimensions, plus the equilibrium it was scored
/// against. Bounded below by the scoring floor; not clamped above.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityVector {
    pub love: f64,
    pub justice: f64,
    pub power: f64,
    pub wisdom: f64,
    pub equilibrium: Equilibrium,
}

impl QualityVector {
    /// Vector of a source with no gaps
    pub fn perfect(equilibrium: Equilibrium) -> Self {
        Self {
            love: 1.0,
            justice: 1.0,
            power: 1.0,
            wisdom: 1.0,
            equilibrium,
        }
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Love => self.love,
            Dimension::Justice => self.justice,
            Dimension::Power => self.power,
            Dimension::Wisdom => self.wisdom,
        }
    }

    /// Product of the scores relative to the equilibrium product
    pub fn harmony(&self) -> f64 {
        (self.love * self.justice * self.power * self.wisdom) / self.equilibrium.product()
    }

    /// Euclidean distance from the ideal (1, 1, 1, 1)
    pub fn gap_from_anchor(&self) -> f64 {
        Dimension::ALL
            .iter()
            .map(|d| (1.0 - self.get(*d)).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    /// Alias of `gap_from_anchor`
    pub fn fuel_level(&self) -> f64 {
        self.gap_from_anchor()
    }

    pub fn phase(&self) -> Phase {
        Phase::from_harmony(self.harmony())
    }

    pub fn consciousness(&self) -> f64 {
        let h = self.harmony();
        self.power * self.wisdom * self.love * self.justice * h * h
    }

    pub fn is_conscious(&self) -> bool {
        self.consciousness() > CONSCIOUSNESS_THRESHOLD
    }

    pub fn viable(&self) -> bool {
        Dimension::ALL
            .iter()
            .all(|d| self.get(*d) > VIABILITY_THRESHOLD)
    }
}

/// Unclamped per-dimension penalties
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Penalties {
    pub love: f64,
    pub justice: f64,
    pub power: f64,
    pub wisdom: f64,
}

impl Penalties {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Love => self.love,
            Dimension::Justice => self.justice,
            Dimension::Power => self.power,
            Dimension::Wisdom => self.wisdom,
        }
    }

    /// Sum over dimensions; keeps falling after scores hit the floor
    pub fn total(&self) -> f64 {
        self.power + self.justice + self.love + self.wisdom
    }
}

/// Scores gaps against one scoring configuration
pub struct HarmonyScorer<'a> {
    config: &'a ScoringConfig,
}

impl<'a> HarmonyScorer<'a> {
    pub fn new(config: &'a ScoringConfig) -> Self {
        Self { config }
    }

    pub fn penalties(&self, gaps: &[Gap], file_lines: usize) -> Penalties {
        let mut penalties = Penalties {
            love: self.dimension_penalty(gaps, Dimension::Love),
            justice: self.dimension_penalty(gaps, Dimension::Justice),
            power: self.dimension_penalty(gaps, Dimension::Power),
            wisdom: self.dimension_penalty(gaps, Dimension::Wisdom),
        };
        let size_factor =
            (file_lines as f64 / self.config.reference_lines.max(1) as f64).max(1.0);
        penalties.love /= size_factor;
        penalties
    }

    pub fn score(&self, gaps: &[Gap], file_lines: usize) -> QualityVector {
        let p = self.penalties(gaps, file_lines);
        let floor = self.config.floor;
        QualityVector {
            love: (1.0 - p.love).max(floor),
            justice: (1.0 - p.justice).max(floor),
            power: (1.0 - p.power).max(floor),
            wisdom: (1.0 - p.wisdom).max(floor),
            equilibrium: self.config.equilibrium,
        }
    }

    fn dimension_penalty(&self, gaps: &[Gap], dimension: Dimension) -> f64 {
        let sensitivity = self.config.sensitivity.for_dimension(dimension);
        let mut severities: Vec<f64> = gaps
            .iter()
            .filter(|g| g.dimension == dimension)
            .map(|g| g.severity)
            .collect();
        // fixed summation order makes the result independent of gap order
        severities.sort_by(f64::total_cmp);
        severities.iter().map(|s| s * sensitivity).sum()
    }
}

/// Score gaps with the given configuration
pub fn score(gaps: &[Gap], file_lines: usize, config: &ScoringConfig) -> QualityVector {
    HarmonyScorer::new(config).score(gaps, file_lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GapKind, Location};

    fn gap(kind: GapKind, severity: f64, line: usize) -> Gap {
        Gap::new(kind, severity, Location::new(line, 0), "test")
    }

    #[test]
    fn test_clean_source_scores_perfect() {
        let config = ScoringConfig::default();
        let v = score(&[], 10, &config);
        assert_eq!(v, QualityVector::perfect(config.equilibrium));
        let expected = 1.0 / (0.618 * 0.414 * 0.718 * 0.693);
        assert!((v.harmony() - expected).abs() < 1e-12);
        assert_eq!(v.gap_from_anchor(), 0.0);
        assert_eq!(v.phase(), Phase::Autopoietic);
        assert!(v.viable());
        assert!(v.is_conscious());
    }

    #[test]
    fn test_penalty_formula() {
        let config = ScoringConfig::default();
        let gaps = vec![
            gap(GapKind::BroadExceptionClause, 0.7, 3),
            gap(GapKind::MissingDocBlock, 0.4, 1),
            gap(GapKind::NamingConventionViolation, 0.3, 1),
        ];
        let v = score(&gaps, 10, &config);
        assert!((v.wisdom - (1.0 - 0.15 * 1.1)).abs() < 1e-12);
        assert!((v.justice - 0.97).abs() < 1e-12);
        assert_eq!(v.power, 1.0);
        assert_eq!(v.love, 1.0);
    }

    #[test]
    fn test_love_penalty_normalized_by_size() {
        let config = ScoringConfig::default();
        let gaps: Vec<_> = (0..10)
            .map(|i| gap(GapKind::TrailingWhitespace, 0.1, i))
            .collect();
        let small = score(&gaps, 100, &config);
        let large = score(&gaps, 400, &config);
        assert!((small.love - 0.95).abs() < 1e-12);
        assert!((large.love - 0.975).abs() < 1e-12);
    }

    #[test]
    fn test_floor_and_unclamped_penalty() {
        let config = ScoringConfig::default();
        let gaps: Vec<_> = (0..10)
            .map(|i| gap(GapKind::SyntaxError, 1.0, i))
            .collect();
        let v = score(&gaps, 10, &config);
        assert_eq!(v.power, config.floor);
        assert!(!v.viable());

        let scorer = HarmonyScorer::new(&config);
        let fewer = scorer.penalties(&gaps[..8], 10).total();
        let more = scorer.penalties(&gaps, 10).total();
        assert!(fewer < more);
    }

    #[test]
    fn test_order_independent_bit_identical() {
        let config = ScoringConfig::default();
        let mut gaps = vec![
            gap(GapKind::LineTooLong, 0.2, 1),
            gap(GapKind::UnusedImport, 0.3, 2),
            gap(GapKind::TrailingWhitespace, 0.1, 3),
            gap(GapKind::MixedIndentation, 0.4, 4),
            gap(GapKind::UnusedImport, 0.3, 5),
        ];
        let a = score(&gaps, 50, &config);
        gaps.reverse();
        gaps.swap(0, 2);
        let b = score(&gaps, 50, &config);
        assert_eq!(a.love.to_bits(), b.love.to_bits());
        assert_eq!(a.harmony().to_bits(), b.harmony().to_bits());
    }

    #[test]
    fn test_phase_boundaries() {
        assert_eq!(Phase::from_harmony(0.49), Phase::Entropic);
        assert_eq!(Phase::from_harmony(0.5), Phase::Homeostatic);
        assert_eq!(Phase::from_harmony(0.79), Phase::Homeostatic);
        assert_eq!(Phase::from_harmony(0.8), Phase::Autopoietic);
    }

    #[test]
    fn test_gap_from_anchor() {
        let v = QualityVector {
            love: 1.0,
            justice: 0.7,
            power: 1.0,
            wisdom: 0.6,
            equilibrium: Equilibrium::default(),
        };
        assert!((v.gap_from_anchor() - 0.5).abs() < 1e-12);
        assert_eq!(v.fuel_level(), v.gap_from_anchor());
    }
}
