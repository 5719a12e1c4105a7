//! Configuration module for harmony-heal
//!
//! This module handles:
//! - Project-level configuration (harmony.toml / .harmonyrc.json)
//! - Detection thresholds and per-kind severities
//! - Scoring constants (equilibrium, sensitivity, floor)

mod heal_config;

pub use heal_config::{
    load_config,
    load_config_file,
    ConfigError,
    DetectionConfig,
    Equilibrium,
    HealConfig,
    ScoringConfig,
    Sensitivity,
    SeverityTable,
    EXAMPLE_CONFIG,
};
