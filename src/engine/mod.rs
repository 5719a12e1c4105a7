//! Iteration controller
//!
//! Repeats detect → score → prioritize → heal → verify on one source text
//! until no gaps remain or a budget runs out. Each tick heals at most
//! `max_fixes_per_tick` gaps whose severities sum to at most
//! `max_severity_per_tick`.
//!
//! # Stopping Conditions
//!
//! - `Converged`: zero gaps
//! - `MaxTicks`: `max_ticks` ticks ran
//! - `NothingFixable`: every remaining gap needs a manual change
//! - `Stagnation`: harmony rose by less than `stagnation_epsilon` and the
//!   unclamped penalty did not fall
//! - `Regression`: a tick lowered harmony; its edits are reverted
//!
//! Harmony never decreases from one tick to the next, except on the tick
//! that makes broken source parse: only then do the non-structural
//! detectors run, and their gaps count from that tick on.

mod controller;
mod diagnosis;
mod result;

pub use controller::{IterationController, State};
pub use diagnosis::{diagnose, Diagnosis};
pub use result::{ActionCounts, FixAction, HealingResult, StopReason, TickRecord};

use crate::config::{ConfigError, HealConfig};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HealError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Heal one source text with the given configuration
pub fn heal(source: &str, config: &HealConfig) -> Result<HealingResult, HealError> {
    IterationController::new(config).run(source)
}
