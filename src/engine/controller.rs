//! The detect → score → prioritize → heal → verify loop

use super::result::{FixAction, HealingResult, StopReason, TickRecord};
use super::HealError;
use crate::config::HealConfig;
use crate::detectors::GapDetector;
use crate::fixes::{FixOutcome, HealingTransformer, TransformResult};
use crate::models::{Gap, GapReport};
use crate::scoring::{HarmonyScorer, Penalties, QualityVector};
use tracing::debug;

/// Float tolerance on the severity budget
const BUDGET_SLACK: f64 = 1e-9;

/// Controller states. Each tick walks
/// `Sensing → Prioritizing → Healing → Verifying` once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Init,
    Sensing,
    Prioritizing,
    Healing,
    Verifying,
    Converged,
    Exhausted(StopReason),
}

impl State {
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Converged | State::Exhausted(_))
    }
}

/// Everything known about one version of the source
#[derive(Debug, Clone)]
struct Analysis {
    report: GapReport,
    vector: QualityVector,
    penalties: Penalties,
}

/// Drives one source text to a terminal state
pub struct IterationController<'a> {
    config: &'a HealConfig,
    detector: GapDetector,
}

impl<'a> IterationController<'a> {
    pub fn new(config: &'a HealConfig) -> Self {
        Self::with_detector(config, GapDetector::new())
    }

    /// Controller running a custom detector set
    pub fn with_detector(config: &'a HealConfig, detector: GapDetector) -> Self {
        Self { config, detector }
    }

    fn sense(&self, source: &str) -> Analysis {
        let report = self.detector.analyze(source, None, &self.config.detection);
        let scorer = HarmonyScorer::new(&self.config.scoring);
        Analysis {
            vector: scorer.score(&report.gaps, report.line_count),
            penalties: scorer.penalties(&report.gaps, report.line_count),
            report,
        }
    }

    /// Fixable gaps in healing priority, within the per-tick count and
    /// severity budgets. Selection stops at the first gap that does not fit;
    /// the first gap always fits.
    fn prioritize(&self, report: &GapReport) -> Vec<Gap> {
        let mut fixable: Vec<&Gap> = report.gaps.iter().filter(|g| g.fixable).collect();
        fixable.sort_by(|a, b| a.priority_cmp(b));

        let mut selected = Vec::new();
        let mut spent = 0.0;
        for gap in fixable {
            if selected.len() >= self.config.max_fixes_per_tick {
                break;
            }
            let over = spent + gap.severity > self.config.max_severity_per_tick + BUDGET_SLACK;
            if !selected.is_empty() && over {
                break;
            }
            spent += gap.severity;
            selected.push(gap.clone());
        }
        selected
    }

    /// Run until converged or exhausted
    pub fn run(&self, source: &str) -> Result<HealingResult, HealError> {
        let mut state = State::Init;
        let mut current = source.to_string();
        let mut tick = 0usize;
        let mut history: Vec<TickRecord> = Vec::new();
        let mut total_gaps_found = 0usize;

        // Filled in as the loop advances
        let mut analysis: Option<Analysis> = None;
        let mut initial: Option<Analysis> = None;
        let mut selected: Vec<Gap> = Vec::new();
        let mut transformed: Option<TransformResult> = None;

        while !state.is_terminal() {
            state = match state {
                State::Init => {
                    self.config.validate()?;
                    State::Sensing
                }
                State::Sensing => {
                    // Verifying leaves the fresh analysis behind for the next tick
                    let current_analysis = match analysis.take() {
                        Some(a) => a,
                        None => self.sense(&current),
                    };
                    if initial.is_none() {
                        initial = Some(current_analysis.clone());
                    }
                    let clean = current_analysis.report.is_clean();
                    analysis = Some(current_analysis);
                    if clean {
                        State::Converged
                    } else {
                        State::Prioritizing
                    }
                }
                State::Prioritizing => {
                    let report = analysis.as_ref().map(|a| &a.report);
                    selected = report.map(|r| self.prioritize(r)).unwrap_or_default();
                    if selected.is_empty() {
                        State::Exhausted(StopReason::NothingFixable)
                    } else {
                        State::Healing
                    }
                }
                State::Healing => {
                    tick += 1;
                    let transformer = HealingTransformer::new(&self.config.detection);
                    transformed = Some(transformer.transform(&current, &selected));
                    State::Verifying
                }
                State::Verifying => {
                    let (Some(before), Some(mut result)) = (analysis.take(), transformed.take())
                    else {
                        // unreachable in practice: Healing always precedes Verifying
                        break;
                    };
                    let mut after = self.sense(&result.source);

                    // Parsing again exposes every non-structural gap at once
                    let became_valid = !before.report.complete && after.report.complete;
                    let regressed =
                        !became_valid && after.vector.harmony() < before.vector.harmony();
                    if regressed {
                        debug!(
                            "Tick {tick}: harmony fell {:.4} -> {:.4}, reverting",
                            before.vector.harmony(),
                            after.vector.harmony()
                        );
                        let reason = "reverted: tick lowered harmony".to_string();
                        result.outcomes = vec![FixOutcome::Failed(reason); selected.len()];
                        result.source = current.clone();
                        after = before.clone();
                    }

                    let record = TickRecord {
                        tick,
                        gaps_found: before.report.gaps.len(),
                        gaps_selected: selected.len(),
                        gaps_healed: result.applied_count(),
                        before: before.vector,
                        after: after.vector,
                        fuel_consumed: before.vector.gap_from_anchor()
                            - after.vector.gap_from_anchor(),
                        batch_rejected: result.rejected,
                        actions: selected
                            .iter()
                            .zip(&result.outcomes)
                            .map(|(gap, outcome)| FixAction {
                                kind: gap.kind,
                                location: gap.location,
                                outcome: outcome.clone(),
                            })
                            .collect(),
                    };
                    debug!(
                        "Tick {}: {} found, {} selected, {} healed, harmony {:.4} -> {:.4}",
                        record.tick,
                        record.gaps_found,
                        record.gaps_selected,
                        record.gaps_healed,
                        record.before.harmony(),
                        record.after.harmony()
                    );
                    total_gaps_found += record.gaps_found;
                    history.push(record);
                    current = result.source;

                    let progressed = became_valid
                        || after.vector.harmony() - before.vector.harmony()
                        >= self.config.stagnation_epsilon
                        || after.penalties.total() < before.penalties.total();
                    let next = if regressed {
                        State::Exhausted(StopReason::Regression)
                    } else if after.report.is_clean() {
                        State::Converged
                    } else if tick >= self.config.max_ticks {
                        State::Exhausted(StopReason::MaxTicks)
                    } else if after.report.fixable_count() == 0 {
                        State::Exhausted(StopReason::NothingFixable)
                    } else if !progressed {
                        State::Exhausted(StopReason::Stagnation)
                    } else {
                        State::Sensing
                    };
                    analysis = Some(after);
                    next
                }
                State::Converged | State::Exhausted(_) => state,
            };
        }

        let stop_reason = match state {
            State::Exhausted(reason) => reason,
            _ => StopReason::Converged,
        };
        let last = match analysis {
            Some(a) => a,
            None => self.sense(&current),
        };
        let first = initial.unwrap_or_else(|| last.clone());

        Ok(HealingResult {
            original_source: source.to_string(),
            source_changed: current != source,
            healed_source: current,
            initial_vector: first.vector,
            final_vector: last.vector,
            total_ticks: tick,
            total_gaps_found,
            total_gaps_healed: history.iter().map(|t| t.gaps_healed).sum(),
            initial_gap_count: first.report.gaps.len(),
            final_gap_count: last.report.gaps.len(),
            stop_reason,
            complete: last.report.complete,
            max_ticks: self.config.max_ticks,
            history,
        })
    }
}
