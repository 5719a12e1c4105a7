//! JSON reporter
//!
//! Diagnoses serialize as-is. Healing results gain the derived metrics
//! (improvement, gap reduction, phases, progress) next to the raw fields.

use crate::engine::{Diagnosis, HealingResult};
use serde_json::json;

pub fn render_diagnosis(diagnosis: &Diagnosis) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(diagnosis)
}

pub fn render_healing(
    file: Option<&str>,
    result: &HealingResult,
) -> Result<String, serde_json::Error> {
    let value = json!({
        "file": file,
        "source_changed": result.source_changed,
        "stop_reason": result.stop_reason,
        "complete": result.complete,
        "total_ticks": result.total_ticks,
        "total_gaps_found": result.total_gaps_found,
        "total_gaps_healed": result.total_gaps_healed,
        "initial_gap_count": result.initial_gap_count,
        "final_gap_count": result.final_gap_count,
        "initial": {
            "vector": result.initial_vector,
            "harmony": result.initial_vector.harmony(),
            "phase": result.initial_vector.phase(),
        },
        "final": {
            "vector": result.final_vector,
            "harmony": result.final_vector.harmony(),
            "phase": result.final_vector.phase(),
        },
        "improvement": result.improvement(),
        "gap_reduction": result.gap_reduction(),
        "convergence_progress": result.convergence_progress(),
        "ticks_remaining": result.estimate_ticks_remaining(),
        "fixes_by_kind": result.fixes_by_kind(),
        "history": result.history,
    });
    serde_json::to_string_pretty(&value)
}
