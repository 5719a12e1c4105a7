//! Diagnose command - read-only report per file

use super::files::collect_files;
use anyhow::{bail, Context, Result};
use harmony_heal::config::HealConfig;
use harmony_heal::engine::diagnose;
use harmony_heal::reporters::{render_diagnosis, OutputFormat};
use harmony_heal::storage::{FsStore, SourceStore};
use rayon::prelude::*;
use std::path::PathBuf;

pub fn run(paths: &[PathBuf], config: &HealConfig, format: OutputFormat) -> Result<()> {
    let files = collect_files(paths)?;
    if files.is_empty() {
        bail!("No Python files found");
    }

    let rendered: Vec<Result<String>> = files
        .par_iter()
        .map(|path| {
            let source = FsStore.read_text(path)?;
            let name = path.display().to_string();
            let diagnosis = diagnose(&source, Some(&name), config);
            render_diagnosis(&diagnosis, format)
                .with_context(|| format!("Failed to render report for {}", name))
        })
        .collect();

    let mut documents = Vec::with_capacity(rendered.len());
    for result in rendered {
        documents.push(result?);
    }
    println!("{}", join_documents(&documents, format));
    Ok(())
}

/// Several JSON documents become one array; text reports are concatenated
pub(super) fn join_documents(documents: &[String], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json if documents.len() == 1 => documents[0].clone(),
        OutputFormat::Json => format!("[\n{}\n]", documents.join(",\n")),
        OutputFormat::Text => documents.concat(),
    }
}
