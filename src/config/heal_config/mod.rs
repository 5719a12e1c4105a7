//! Healing configuration
//!
//! Loads per-project configuration from `harmony.toml` or `.harmonyrc.json`
//! in a project directory. Every field has a default, so an empty file is a
//! valid configuration.
//!
//! # Configuration Format
//!
//! ```toml
//! # harmony.toml
//! max_ticks = 20
//! max_fixes_per_tick = 5
//! max_severity_per_tick = 1.5
//!
//! [detection]
//! max_line_length = 100
//! max_complexity = 10
//!
//! [detection.severity]
//! broad_exception_clause = 0.7
//!
//! [scoring]
//! floor = 0.01
//! reference_lines = 200
//!
//! [scoring.sensitivity]
//! love = 0.05
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Dimension, GapKind};

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for `{field}`: {value} ({expected})")]
    OutOfRange {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("unsupported config file extension: {0}")]
    UnsupportedFormat(PathBuf),
}

/// Example written by `harmony-heal init`
pub const EXAMPLE_CONFIG: &str = r#"# harmony-heal configuration
#
# Every value below is the built-in default. Delete what you don't change.

# Upper bound on healing iterations per file
max_ticks = 20

# Minimum harmony improvement that counts as progress
stagnation_epsilon = 1e-9

# Per-iteration budget: at most this many fixes, and their severities
# summed no higher than max_severity_per_tick (the first fix always fits)
max_fixes_per_tick = 10
max_severity_per_tick = 2.0

[detection]
max_line_length = 100
max_complexity = 10
tab_size = 8
doc_placeholder = "Add documentation."

[detection.severity]
missing_block_terminator = 1.0
unclosed_literal = 1.0
unbalanced_bracket = 1.0
syntax_error = 1.0
naming_convention_violation = 0.3
high_complexity = 0.5
trailing_whitespace = 0.1
line_too_long = 0.2
mixed_indentation = 0.4
unused_import = 0.3
missing_doc_block = 0.4
broad_exception_clause = 0.7

[scoring]
floor = 0.01
reference_lines = 200

[scoring.equilibrium]
love = 0.618
justice = 0.414
power = 0.718
wisdom = 0.693

[scoring.sensitivity]
love = 0.05
justice = 0.1
power = 0.3
wisdom = 0.15
"#;

/// Top-level configuration for a healing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealConfig {
    /// Maximum number of healing ticks (default: 20)
    pub max_ticks: usize,

    /// Harmony improvement below this counts as no progress (default: 1e-9)
    pub stagnation_epsilon: f64,

    /// Carried for compatibility; currently multiplies nothing (default: 0.02)
    pub learning_rate: f64,

    /// Most fixes applied in one tick (default: 10)
    pub max_fixes_per_tick: usize,

    /// Severity one tick may spend; the first selected gap is exempt (default: 2.0)
    pub max_severity_per_tick: f64,

    pub detection: DetectionConfig,
    pub scoring: ScoringConfig,
}

impl Default for HealConfig {
    fn default() -> Self {
        Self {
            max_ticks: 20,
            stagnation_epsilon: 1e-9,
            learning_rate: 0.02,
            max_fixes_per_tick: 10,
            max_severity_per_tick: 2.0,
            detection: DetectionConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

/// Thresholds and severities used by the gap detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Longest allowed line, in characters (default: 100)
    pub max_line_length: usize,
    /// Highest allowed cyclomatic complexity per function (default: 10)
    pub max_complexity: usize,
    /// Tab stop width used when expanding mixed indentation (default: 8)
    pub tab_size: usize,
    /// Text of the placeholder doc block
    pub doc_placeholder: String,
    pub severity: SeverityTable,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            max_line_length: 100,
            max_complexity: 10,
            tab_size: 8,
            doc_placeholder: "Add documentation.".to_string(),
            severity: SeverityTable::default(),
        }
    }
}

/// Severity per gap kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityTable {
    pub missing_block_terminator: f64,
    pub unclosed_literal: f64,
    pub unbalanced_bracket: f64,
    pub syntax_error: f64,
    pub naming_convention_violation: f64,
    pub high_complexity: f64,
    pub trailing_whitespace: f64,
    pub line_too_long: f64,
    pub mixed_indentation: f64,
    pub unused_import: f64,
    pub missing_doc_block: f64,
    pub broad_exception_clause: f64,
}

impl Default for SeverityTable {
    fn default() -> Self {
        Self {
            missing_block_terminator: 1.0,
            unclosed_literal: 1.0,
            unbalanced_bracket: 1.0,
            syntax_error: 1.0,
            naming_convention_violation: 0.3,
            high_complexity: 0.5,
            trailing_whitespace: 0.1,
            line_too_long: 0.2,
            mixed_indentation: 0.4,
            unused_import: 0.3,
            missing_doc_block: 0.4,
            broad_exception_clause: 0.7,
        }
    }
}

impl SeverityTable {
    pub fn for_kind(&self, kind: GapKind) -> f64 {
        match kind {
            GapKind::MissingBlockTerminator => self.missing_block_terminator,
            GapKind::UnclosedLiteral => self.unclosed_literal,
            GapKind::UnbalancedBracket => self.unbalanced_bracket,
            GapKind::SyntaxError => self.syntax_error,
            GapKind::NamingConventionViolation => self.naming_convention_violation,
            GapKind::HighComplexity => self.high_complexity,
            GapKind::TrailingWhitespace => self.trailing_whitespace,
            GapKind::LineTooLong => self.line_too_long,
            GapKind::MixedIndentation => self.mixed_indentation,
            GapKind::UnusedImport => self.unused_import,
            GapKind::MissingDocBlock => self.missing_doc_block,
            GapKind::BroadExceptionClause => self.broad_exception_clause,
        }
    }
}

/// Constants of the harmony scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Lowest value a dimension score can take (default: 0.01)
    pub floor: f64,
    /// File size at which Love penalties start being diluted (default: 200)
    pub reference_lines: usize,
    pub equilibrium: Equilibrium,
    pub sensitivity: Sensitivity,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            floor: 0.01,
            reference_lines: 200,
            equilibrium: Equilibrium::default(),
            sensitivity: Sensitivity::default(),
        }
    }
}

/// Reference point harmony is measured against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Equilibrium {
    pub love: f64,
    pub justice: f64,
    pub power: f64,
    pub wisdom: f64,
}

impl Default for Equilibrium {
    fn default() -> Self {
        Self {
            love: 0.618,
            justice: 0.414,
            power: 0.718,
            wisdom: 0.693,
        }
    }
}

impl Equilibrium {
    pub fn product(&self) -> f64 {
        self.love * self.justice * self.power * self.wisdom
    }
}

/// How strongly each unit of severity lowers a dimension score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sensitivity {
    pub love: f64,
    pub justice: f64,
    pub power: f64,
    pub wisdom: f64,
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self {
            love: 0.05,
            justice: 0.1,
            power: 0.3,
            wisdom: 0.15,
        }
    }
}

impl Sensitivity {
    pub fn for_dimension(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Love => self.love,
            Dimension::Justice => self.justice,
            Dimension::Power => self.power,
            Dimension::Wisdom => self.wisdom,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: value.to_string(),
            expected: "must be a positive number",
        })
    }
}

fn at_least(field: &'static str, value: usize, min: usize) -> Result<(), ConfigError> {
    if value >= min {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: value.to_string(),
            expected: if min == 1 {
                "must be at least 1"
            } else {
                "too small"
            },
        })
    }
}

impl HealConfig {
    /// Check every constant before any processing starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        at_least("max_ticks", self.max_ticks, 1)?;
        positive("learning_rate", self.learning_rate)?;
        if !(self.stagnation_epsilon.is_finite() && self.stagnation_epsilon >= 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "stagnation_epsilon",
                value: self.stagnation_epsilon.to_string(),
                expected: "must be zero or positive",
            });
        }
        at_least("max_fixes_per_tick", self.max_fixes_per_tick, 1)?;
        positive("max_severity_per_tick", self.max_severity_per_tick)?;
        self.detection.validate()?;
        self.scoring.validate()
    }
}

impl DetectionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        at_least("detection.max_line_length", self.max_line_length, 20)?;
        at_least("detection.max_complexity", self.max_complexity, 1)?;
        at_least("detection.tab_size", self.tab_size, 1)?;
        if self.doc_placeholder.contains("\"\"\"") || self.doc_placeholder.contains('\n') {
            return Err(ConfigError::OutOfRange {
                field: "detection.doc_placeholder",
                value: format!("{:?}", self.doc_placeholder),
                expected: "must be a single line without triple quotes",
            });
        }
        for kind in GapKind::ALL {
            positive("detection.severity", self.severity.for_kind(kind))?;
        }
        Ok(())
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.floor.is_finite() && self.floor > 0.0 && self.floor < 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "scoring.floor",
                value: self.floor.to_string(),
                expected: "must be between 0 and 1",
            });
        }
        at_least("scoring.reference_lines", self.reference_lines, 1)?;
        positive("scoring.equilibrium.love", self.equilibrium.love)?;
        positive("scoring.equilibrium.justice", self.equilibrium.justice)?;
        positive("scoring.equilibrium.power", self.equilibrium.power)?;
        positive("scoring.equilibrium.wisdom", self.equilibrium.wisdom)?;
        positive("scoring.sensitivity.love", self.sensitivity.love)?;
        positive("scoring.sensitivity.justice", self.sensitivity.justice)?;
        positive("scoring.sensitivity.power", self.sensitivity.power)?;
        positive("scoring.sensitivity.wisdom", self.sensitivity.wisdom)
    }
}

/// Load configuration from a project directory
///
/// Looks for `harmony.toml` first, then `.harmonyrc.json`. A file that
/// fails to load is logged and skipped; with no usable file the defaults
/// are returned.
pub fn load_config(dir: &Path) -> HealConfig {
    for name in ["harmony.toml", ".harmonyrc.json"] {
        let path = dir.join(name);
        if !path.exists() {
            continue;
        }
        match load_config_file(&path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
            }
        }
    }

    debug!("No config found in {}, using defaults", dir.display());
    HealConfig::default()
}

/// Load configuration from an explicit file, propagating every failure
pub fn load_config_file(path: &Path) -> Result<HealConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let parse_err = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let config: HealConfig = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|e| parse_err(e.to_string()))?,
        Some("json") => serde_json::from_str(&content).map_err(|e| parse_err(e.to_string()))?,
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    config.validate()?;
    Ok(config)
}
