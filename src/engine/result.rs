//! Tick history and the final healing result

use crate::fixes::FixOutcome;
use crate::models::{GapKind, Location};
use crate::scoring::QualityVector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Why the controller stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// No gaps left
    Converged,
    MaxTicks,
    /// Remaining gaps all need a manual change
    NothingFixable,
    /// A tick made no measurable progress
    Stagnation,
    /// A tick lowered harmony and was reverted
    Regression,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            StopReason::Converged => "converged",
            StopReason::MaxTicks => "tick budget exhausted",
            StopReason::NothingFixable => "nothing left to fix automatically",
            StopReason::Stagnation => "no further progress",
            StopReason::Regression => "last batch lowered harmony",
        };
        f.write_str(text)
    }
}

/// What the transformer did with one selected gap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixAction {
    pub kind: GapKind,
    pub location: Location,
    pub outcome: FixOutcome,
}

/// Outcome tally for one gap kind across a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCounts {
    pub applied: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ActionCounts {
    fn record(&mut self, outcome: &FixOutcome) {
        match outcome {
            FixOutcome::Applied => self.applied += 1,
            FixOutcome::Skipped(_) => self.skipped += 1,
            FixOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// One detect-heal-verify cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    /// 1-based
    pub tick: usize,
    pub gaps_found: usize,
    pub gaps_selected: usize,
    /// Number of `Applied` outcomes that survived verification
    pub gaps_healed: usize,
    pub before: QualityVector,
    pub after: QualityVector,
    /// Drop in gap-from-anchor over the tick
    pub fuel_consumed: f64,
    pub batch_rejected: bool,
    /// One entry per selected gap, in selection order
    pub actions: Vec<FixAction>,
}

impl TickRecord {
    pub fn improvement(&self) -> f64 {
        self.after.harmony() - self.before.harmony()
    }
}

/// Outcome of a full `heal` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealingResult {
    pub original_source: String,
    pub healed_source: String,
    pub source_changed: bool,
    pub initial_vector: QualityVector,
    pub final_vector: QualityVector,
    pub total_ticks: usize,
    /// Summed over ticks, so a gap still present after several ticks counts
    /// once per tick
    pub total_gaps_found: usize,
    pub total_gaps_healed: usize,
    pub initial_gap_count: usize,
    pub final_gap_count: usize,
    pub stop_reason: StopReason,
    /// False when the final source still failed structural parsing
    pub complete: bool,
    /// `max_ticks` the run was allowed
    pub max_ticks: usize,
    pub history: Vec<TickRecord>,
}

impl HealingResult {
    /// Change in harmony from the first to the last analysis
    pub fn improvement(&self) -> f64 {
        self.final_vector.harmony() - self.initial_vector.harmony()
    }

    /// Fraction of the initial gap-from-anchor that was closed
    pub fn gap_reduction(&self) -> f64 {
        let initial = self.initial_vector.gap_from_anchor();
        if initial == 0.0 {
            return 1.0;
        }
        (initial - self.final_vector.gap_from_anchor()) / initial
    }

    pub fn converged(&self) -> bool {
        self.stop_reason == StopReason::Converged
    }

    /// Share of the initial distance to the anchor closed so far, in `[0, 1]`
    pub fn convergence_progress(&self) -> f64 {
        self.gap_reduction().clamp(0.0, 1.0)
    }

    /// Ticks still needed at the average fuel consumed per tick so far,
    /// capped by what is left of `max_ticks`
    pub fn estimate_ticks_remaining(&self) -> usize {
        if self.converged() {
            return 0;
        }
        let left = self.max_ticks.saturating_sub(self.history.len());
        if self.history.is_empty() {
            return left;
        }
        let consumed: f64 = self.history.iter().map(|t| t.fuel_consumed).sum();
        let per_tick = consumed / self.history.len() as f64;
        if per_tick <= 0.0 {
            return left;
        }
        let needed = (self.final_vector.gap_from_anchor() / per_tick).ceil() as usize;
        needed.min(left)
    }

    /// Fix outcomes over every tick, counted per gap kind
    pub fn fixes_by_kind(&self) -> BTreeMap<GapKind, ActionCounts> {
        let mut summary: BTreeMap<GapKind, ActionCounts> = BTreeMap::new();
        for action in self.history.iter().flat_map(|t| &t.actions) {
            summary.entry(action.kind).or_default().record(&action.outcome);
        }
        summary
    }
}
