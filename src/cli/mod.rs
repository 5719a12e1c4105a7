//! CLI command definitions and handlers

mod diagnose;
mod files;
mod heal;
mod init;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use harmony_heal::config::{load_config, load_config_file, HealConfig};
use harmony_heal::reporters::OutputFormat;
use std::path::{Path, PathBuf};

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse().map_err(|e: harmony_heal::reporters::UnknownFormat| e.to_string())
}

/// harmony-heal - self-healing code quality for Python
#[derive(Parser, Debug)]
#[command(name = "harmony-heal")]
#[command(
    version,
    about = "Detect quality gaps in Python code and heal them with safe mechanical fixes",
    after_help = "\
Examples:
  harmony-heal diagnose src/               Report gaps and harmony for every file
  harmony-heal heal app.py --dry-run       Show what healing would do
  harmony-heal heal src/ --report          Heal in place (keeps .bak backups)
  cat app.py | harmony-heal heal --stdin   Heal stdin to stdout"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Configuration file (default: harmony.toml or .harmonyrc.json in the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Report gaps and quality scores without changing anything
    Diagnose {
        /// Files or directories to diagnose
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = parse_format)]
        format: OutputFormat,
    },

    /// Iteratively heal files until they converge or the budget runs out
    Heal {
        /// Files or directories to heal
        #[arg(required_unless_present = "stdin")]
        paths: Vec<PathBuf>,

        /// Write the healed source here instead of in place (single file only)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Read source from stdin and write the healed source to stdout
        #[arg(long, conflicts_with = "paths")]
        stdin: bool,

        /// Override the tick budget
        #[arg(long)]
        max_ticks: Option<usize>,

        /// Do not write a .bak backup before overwriting
        #[arg(long)]
        no_backup: bool,

        /// Heal in memory only; never write files
        #[arg(long)]
        dry_run: bool,

        /// Print a healing report for every file
        #[arg(long)]
        report: bool,

        /// Report format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = parse_format)]
        format: OutputFormat,
    },

    /// Write an example harmony.toml into the current directory
    Init {
        /// Overwrite an existing harmony.toml
        #[arg(long)]
        force: bool,
    },
}

/// Explicit `--config` wins; otherwise look in the current directory
fn resolve_config(explicit: Option<&Path>) -> Result<HealConfig> {
    match explicit {
        Some(path) => load_config_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            Ok(load_config(&cwd))
        }
    }
}

/// Apply command-line overrides, then check the result once for all files
fn with_overrides(mut config: HealConfig, max_ticks: Option<usize>) -> Result<HealConfig> {
    if let Some(ticks) = max_ticks {
        config.max_ticks = ticks;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { force } => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            init::run(&cwd, force)
        }

        Commands::Diagnose { paths, format } => {
            let config = resolve_config(cli.config.as_deref())?;
            diagnose::run(&paths, &config, format)
        }

        Commands::Heal {
            paths,
            output,
            stdin,
            max_ticks,
            no_backup,
            dry_run,
            report,
            format,
        } => {
            let config = with_overrides(resolve_config(cli.config.as_deref())?, max_ticks)?;
            let options = heal::HealOptions {
                output,
                backup: !no_backup,
                dry_run,
                report,
                format,
            };
            if stdin {
                heal::run_stdin(&config, &options)
            } else {
                heal::run(&paths, &config, &options)
            }
        }
    }
}
