//! Text (terminal) reporter with colors and formatting

use crate::engine::{Diagnosis, HealingResult, StopReason};
use crate::fixes::FixOutcome;
use crate::models::{Dimension, Gap};
use crate::scoring::{Phase, QualityVector};
use console::style;

const RULE: &str = "──────────────────────────────────────";

fn phase_styled(phase: Phase) -> String {
    let styled = match phase {
        Phase::Entropic => style(phase).red(),
        Phase::Homeostatic => style(phase).yellow(),
        Phase::Autopoietic => style(phase).green(),
    };
    styled.bold().to_string()
}

fn vector_line(v: &QualityVector) -> String {
    Dimension::ALL
        .iter()
        .map(|d| format!("{} {:.3}", d.letter(), v.get(*d)))
        .collect::<Vec<_>>()
        .join("  ")
}

fn gap_line(gap: &Gap) -> String {
    let tag = if gap.fixable {
        style("[fixable]").green().to_string()
    } else {
        style("[manual]").dim().to_string()
    };
    format!(
        "  {:>5}:{:<3} {} {} {}",
        gap.location.line,
        gap.location.column,
        tag,
        style(gap.kind).cyan(),
        gap.description
    )
}

/// Render a diagnosis as formatted terminal output
pub fn render_diagnosis(d: &Diagnosis) -> String {
    let mut out = String::new();
    let name = d.file.as_deref().unwrap_or("<source>");

    out.push_str(&format!("\n{} {}\n", style("Diagnosis").bold(), style(name).cyan()));
    out.push_str(&format!("{}\n", style(RULE).dim()));
    out.push_str(&format!(
        "Harmony: {}  Phase: {}  Distance: {:.3}  Fuel available: {:.2}\n",
        style(format!("{:.3}", d.harmony)).bold(),
        phase_styled(d.phase),
        d.gap_from_anchor,
        d.fuel_available
    ));
    out.push_str(&format!("Scores:  {}\n", vector_line(&d.vector)));
    out.push_str(&format!(
        "Consciousness: {:.3}{}  Viable: {}\n",
        d.consciousness,
        if d.conscious { " (conscious)" } else { "" },
        if d.viable { "yes" } else { "no" }
    ));
    if !d.complete {
        out.push_str(&format!(
            "{}\n",
            style("Structure is broken; only structural gaps were checked").yellow()
        ));
    }

    if d.gaps.is_empty() {
        out.push_str(&format!("\n{} No gaps found\n", style("✓").green()));
        return out;
    }

    out.push_str(&format!(
        "\n{} ({} total, {} fixable, {} manual)\n",
        style("GAPS").bold(),
        d.gaps.len(),
        d.fixable_count,
        d.manual_count()
    ));
    for dimension in Dimension::ALL {
        let gaps: Vec<&Gap> = d.gaps.iter().filter(|g| g.dimension == dimension).collect();
        if gaps.is_empty() {
            continue;
        }
        out.push_str(&format!("{} ({})\n", style(dimension.label()).bold(), gaps.len()));
        for gap in gaps {
            out.push_str(&format!("{}\n", gap_line(gap)));
        }
    }
    out
}

/// Render a healing result as formatted terminal output
pub fn render_healing(file: Option<&str>, r: &HealingResult) -> String {
    let mut out = String::new();
    let name = file.unwrap_or("<source>");

    out.push_str(&format!("\n{} {}\n", style("Healing").bold(), style(name).cyan()));
    out.push_str(&format!("{}\n", style(RULE).dim()));
    let stop = match r.stop_reason {
        StopReason::Converged => style(r.stop_reason).green().to_string(),
        StopReason::Regression => style(r.stop_reason).red().to_string(),
        _ => style(r.stop_reason).yellow().to_string(),
    };
    out.push_str(&format!("Stopped: {} after {} tick(s)\n", stop, r.total_ticks));
    out.push_str(&format!(
        "Harmony: {:.3} -> {}  ({:+.3})\n",
        r.initial_vector.harmony(),
        style(format!("{:.3}", r.final_vector.harmony())).bold(),
        r.improvement()
    ));
    out.push_str(&format!(
        "Phase:   {} -> {}\n",
        phase_styled(r.initial_vector.phase()),
        phase_styled(r.final_vector.phase())
    ));
    out.push_str(&format!(
        "Gaps:    {} -> {}  ({} healed, {:.0}% of distance closed)\n",
        r.initial_gap_count,
        r.final_gap_count,
        r.total_gaps_healed,
        r.gap_reduction() * 100.0
    ));
    out.push_str(&format!(
        "Progress: {:.1}%  (about {} more tick(s) at this rate)\n",
        r.convergence_progress() * 100.0,
        r.estimate_ticks_remaining()
    ));
    if !r.source_changed {
        out.push_str(&format!("{}\n", style("Source unchanged").dim()));
    }

    if !r.history.is_empty() {
        out.push_str(&format!("\n{}\n", style("TICKS").bold()));
        out.push_str(&format!(
            "{}\n",
            style("  #  found  selected  healed  harmony").dim()
        ));
        for t in &r.history {
            out.push_str(&format!(
                "  {:<2} {:>5} {:>9} {:>7}  {:.3} -> {:.3}{}\n",
                t.tick,
                t.gaps_found,
                t.gaps_selected,
                t.gaps_healed,
                t.before.harmony(),
                t.after.harmony(),
                if t.batch_rejected { "  (rejected)" } else { "" }
            ));
            for action in &t.actions {
                let (tag, reason) = match &action.outcome {
                    FixOutcome::Applied => continue,
                    FixOutcome::Skipped(reason) => (style("skipped").yellow(), reason),
                    FixOutcome::Failed(reason) => (style("failed").red(), reason),
                };
                out.push_str(&format!(
                    "     {} {}:{} {} - {}\n",
                    tag, action.location.line, action.location.column, action.kind, reason
                ));
            }
        }

        out.push_str(&format!("\n{}\n", style("FIXES BY KIND").bold()));
        for (kind, counts) in r.fixes_by_kind() {
            out.push_str(&format!(
                "  {:<26} {} applied, {} skipped, {} failed\n",
                kind.to_string(),
                counts.applied,
                counts.skipped,
                counts.failed
            ));
        }
    }
    out
}
