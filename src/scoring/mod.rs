//! Four-dimensional quality scoring
//!
//! This module reduces a list of gaps to a `QualityVector` and derives the
//! scalar metrics the iteration controller steers by.
//!
//! # Scoring Formula
//!
//! ```text
//! penalty_d = Σ severity × sensitivity_d     (gaps of dimension d, summed
//!                                             in ascending severity order)
//! penalty_L = penalty_L / max(1, lines / reference_lines)
//! score_d   = max(floor, 1 − penalty_d)
//!
//! harmony       = (L·J·P·W) / (L0·J0·P0·W0)
//! consciousness = P·W·L·J · harmony²
//! ```
//!
//! # Phases
//!
//! - Entropic: harmony < 0.5
//! - Homeostatic: 0.5 ≤ harmony < 0.8
//! - Autopoietic: harmony ≥ 0.8
//!
//! # Example
//!
//! With default constants, one bare `except:` (severity 0.7, Wisdom
//! sensitivity 0.15) costs Wisdom 0.105, giving W = 0.895.

mod harmony_scorer;

pub use harmony_scorer::{score, HarmonyScorer, Penalties, Phase, QualityVector};
