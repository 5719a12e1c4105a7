//! Base detector trait and types
//!
//! This module defines the core abstractions for gap detection:
//! - `Detector` trait that all detectors implement
//! - `DetectionContext`, the parsed views of one source text shared by
//!   every detector in a pass

use crate::config::DetectionConfig;
use crate::models::{Dimension, Gap, GapKind, Location};
use crate::parsers::lexical::LexicalScan;
use crate::parsers::python::PythonModule;
use crate::parsers::SourceLines;

/// Everything a detector may look at. Built once per detection pass.
pub struct DetectionContext<'a> {
    pub source: &'a str,
    pub lines: &'a SourceLines,
    pub lexical: &'a LexicalScan,
    /// `None` when the structural parser could not run at all
    pub module: Option<&'a PythonModule>,
    pub config: &'a DetectionConfig,
}

impl DetectionContext<'_> {
    /// Gap with the configured severity for its kind
    pub fn gap(&self, kind: GapKind, location: Location, description: impl Into<String>) -> Gap {
        Gap::new(
            kind,
            self.config.severity.for_kind(kind),
            location,
            description,
        )
    }
}

/// Trait for all gap detectors
///
/// Detectors are pure: they read the context and return gaps, never
/// failing. Malformed input shows up as gaps, not errors.
///
/// # Example Implementation
///
/// ```ignore
/// pub struct MyDetector;
///
/// impl Detector for MyDetector {
///     fn name(&self) -> &'static str {
///         "my-detector"
///     }
///
///     fn description(&self) -> &'static str {
///         "Detects my specific gap"
///     }
///
///     fn dimension(&self) -> Dimension {
///         Dimension::Love
///     }
///
///     fn detect(&self, ctx: &DetectionContext) -> Vec<Gap> {
///         vec![]
///     }
/// }
/// ```
pub trait Detector: Send + Sync {
    /// Unique identifier for this detector
    fn name(&self) -> &'static str;

    /// Human-readable description of what this detector finds
    fn description(&self) -> &'static str;

    /// Dimension every gap from this detector belongs to
    fn dimension(&self) -> Dimension;

    /// Run detection and return gaps in any order
    fn detect(&self, ctx: &DetectionContext) -> Vec<Gap>;
}
