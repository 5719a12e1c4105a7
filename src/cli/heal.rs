//! Heal command - iterate each file to convergence and write it back

use super::diagnose::join_documents;
use super::files::collect_files;
use anyhow::{bail, Context, Result};
use console::style;
use harmony_heal::config::HealConfig;
use harmony_heal::engine::{heal, HealingResult};
use harmony_heal::reporters::{render_healing, OutputFormat};
use harmony_heal::storage::{write_with_backup, FsStore, SourceStore};
use rayon::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct HealOptions {
    pub output: Option<PathBuf>,
    pub backup: bool,
    pub dry_run: bool,
    pub report: bool,
    pub format: OutputFormat,
}

/// What happened to one file
struct FileOutcome {
    path: PathBuf,
    result: HealingResult,
    written_to: Option<PathBuf>,
}

fn heal_file(path: &Path, config: &HealConfig, options: &HealOptions) -> Result<FileOutcome> {
    let source = FsStore.read_text(path)?;
    let result = heal(&source, config)?;

    let target = options.output.clone().unwrap_or_else(|| path.to_path_buf());
    let mut written_to = None;
    let must_write = result.source_changed || options.output.is_some();
    if must_write && !options.dry_run {
        if options.backup && target.exists() {
            write_with_backup(&FsStore, &target, &result.healed_source)?;
        } else {
            FsStore.write_text(&target, &result.healed_source)?;
        }
        written_to = Some(target);
    }

    info!(
        "Healed {}: {} gap(s) healed in {} tick(s), harmony {:.3} -> {:.3} ({})",
        path.display(),
        result.total_gaps_healed,
        result.total_ticks,
        result.initial_vector.harmony(),
        result.final_vector.harmony(),
        result.stop_reason
    );
    Ok(FileOutcome {
        path: path.to_path_buf(),
        result,
        written_to,
    })
}

pub fn run(paths: &[PathBuf], config: &HealConfig, options: &HealOptions) -> Result<()> {
    let files = collect_files(paths)?;
    if files.is_empty() {
        bail!("No Python files found");
    }
    if options.output.is_some() && files.len() != 1 {
        bail!("--output needs exactly one input file, got {}", files.len());
    }

    let outcomes: Vec<Result<FileOutcome>> = files
        .par_iter()
        .map(|path| {
            heal_file(path, config, options)
                .with_context(|| format!("Failed to heal {}", path.display()))
        })
        .collect();

    let mut reports = Vec::new();
    let mut failures = 0usize;
    for outcome in outcomes {
        let outcome = match outcome {
            Ok(o) => o,
            Err(e) => {
                eprintln!("{} {:#}", style("error:").red().bold(), e);
                failures += 1;
                continue;
            }
        };
        let name = outcome.path.display().to_string();
        if options.report || options.dry_run {
            reports.push(render_healing(Some(&name), &outcome.result, options.format)?);
        } else if let Some(written) = &outcome.written_to {
            println!(
                "{} {} ({} healed, {})",
                style("✓").green(),
                style(written.display()).cyan(),
                outcome.result.total_gaps_healed,
                outcome.result.stop_reason
            );
        }
    }
    if !reports.is_empty() {
        println!("{}", join_documents(&reports, options.format));
    }

    if failures > 0 {
        bail!("{} file(s) could not be healed", failures);
    }
    Ok(())
}

/// Heal stdin; the healed source goes to stdout (or `--output`), reports to stderr
pub fn run_stdin(config: &HealConfig, options: &HealOptions) -> Result<()> {
    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .context("Failed to read stdin")?;
    let result = heal(&source, config)?;

    match &options.output {
        Some(path) if !options.dry_run => FsStore.write_text(path, &result.healed_source)?,
        Some(_) => {}
        None => print!("{}", result.healed_source),
    }
    if options.report {
        eprintln!("{}", render_healing(Some("<stdin>"), &result, options.format)?);
    }
    Ok(())
}
