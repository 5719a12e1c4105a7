//! harmony-heal - self-healing code quality for Python sources
//!
//! Detects quality gaps, scores them on four dimensions (Power, Justice,
//! Love, Wisdom) and applies safe mechanical repairs until the source
//! converges or a budget runs out.
//!
//! ```ignore
//! use harmony_heal::{heal, HealConfig};
//!
//! let result = heal("import os\nx = 1   \n", &HealConfig::default())?;
//! assert_eq!(result.healed_source, "# import os\nx = 1\n");
//! ```

pub mod config;
pub mod detectors;
pub mod engine;
pub mod fixes;
pub mod models;
pub mod parsers;
pub mod reporters;
pub mod scoring;
pub mod storage;

pub use config::{ConfigError, HealConfig};
pub use detectors::analyze;
pub use engine::{
    diagnose, heal, Diagnosis, FixAction, HealError, HealingResult, StopReason, TickRecord,
};
pub use models::{Dimension, Gap, GapKind, GapReport};
pub use scoring::{score, QualityVector};
pub use storage::StorageError;
