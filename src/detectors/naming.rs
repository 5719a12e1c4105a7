//! Naming convention and complexity detectors (Justice)
//!
//! Neither kind is mechanically repairable: renaming needs reference
//! resolution and lowering complexity needs a refactor.

use crate::detectors::base::{DetectionContext, Detector};
use crate::models::{Dimension, FixHint, Gap, GapKind, Location};
use crate::parsers::python::DefinitionKind;
use regex::Regex;
use std::sync::OnceLock;

static SNAKE_CASE: OnceLock<Regex> = OnceLock::new();
static PASCAL_CASE: OnceLock<Regex> = OnceLock::new();
static WORD_BOUNDARY: OnceLock<Regex> = OnceLock::new();
static LOWER_UPPER: OnceLock<Regex> = OnceLock::new();

fn snake_case() -> &'static Regex {
    SNAKE_CASE.get_or_init(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("valid regex"))
}

fn pascal_case() -> &'static Regex {
    PASCAL_CASE.get_or_init(|| Regex::new(r"^_*[A-Z][a-zA-Z0-9]*$").expect("valid regex"))
}

/// `HTTPServer` -> `HTTP_Server`
fn word_boundary() -> &'static Regex {
    WORD_BOUNDARY.get_or_init(|| Regex::new(r"(.)([A-Z][a-z]+)").expect("valid regex"))
}

/// `getValue` -> `get_Value`
fn lower_upper() -> &'static Regex {
    LOWER_UPPER.get_or_init(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid regex"))
}

/// Conventional spelling of a function name
pub fn to_snake_case(name: &str) -> String {
    let s = word_boundary().replace_all(name, "${1}_${2}");
    lower_upper()
        .replace_all(&s, "${1}_${2}")
        .to_lowercase()
        .replace("__", "_")
}

/// Conventional spelling of a class name, keeping leading underscores
pub fn to_pascal_case(name: &str) -> String {
    let stripped = name.trim_start_matches('_');
    let prefix = &name[..name.len() - stripped.len()];
    let body: String = stripped
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect();
    format!("{prefix}{body}")
}

pub struct NamingDetector;

impl NamingDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NamingDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for NamingDetector {
    fn name(&self) -> &'static str {
        "naming-convention"
    }

    fn description(&self) -> &'static str {
        "Detects functions not in snake_case and classes not in PascalCase"
    }

    fn dimension(&self) -> Dimension {
        Dimension::Justice
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Gap> {
        let Some(module) = ctx.module else {
            return Vec::new();
        };

        module
            .definitions
            .iter()
            .filter_map(|def| {
                let (suggestion, style, what) = match def.kind {
                    // private helpers may use any spelling
                    DefinitionKind::Function if def.name.starts_with('_') => return None,
                    DefinitionKind::Function if snake_case().is_match(&def.name) => return None,
                    DefinitionKind::Function => (to_snake_case(&def.name), "snake_case", "Function"),
                    DefinitionKind::Class if pascal_case().is_match(&def.name) => return None,
                    DefinitionKind::Class => (to_pascal_case(&def.name), "PascalCase", "Class"),
                };
                Some(
                    ctx.gap(
                        GapKind::NamingConventionViolation,
                        Location::new(def.line, def.column),
                        format!("{what} '{}' should use {style} (e.g. '{suggestion}')", def.name),
                    )
                    .with_hint(FixHint::Rename { suggestion }),
                )
            })
            .collect()
    }
}

pub struct ComplexityDetector;

impl ComplexityDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ComplexityDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for ComplexityDetector {
    fn name(&self) -> &'static str {
        "high-complexity"
    }

    fn description(&self) -> &'static str {
        "Detects functions whose cyclomatic complexity exceeds the threshold"
    }

    fn dimension(&self) -> Dimension {
        Dimension::Justice
    }

    fn detect(&self, ctx: &DetectionContext) -> Vec<Gap> {
        let Some(module) = ctx.module else {
            return Vec::new();
        };
        let max = ctx.config.max_complexity;

        module
            .definitions
            .iter()
            .filter(|d| d.kind == DefinitionKind::Function && d.complexity > max)
            .map(|d| {
                ctx.gap(
                    GapKind::HighComplexity,
                    Location::new(d.line, d.column),
                    format!(
                        "Function '{}' has complexity {} (max {max})",
                        d.name, d.complexity
                    ),
                )
            })
            .collect()
    }
}
