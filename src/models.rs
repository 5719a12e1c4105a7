//! Core data models for harmony-heal
//!
//! These models are shared by the detector, scorer, transformer and
//! iteration controller. Gaps are plain values: every detection pass builds
//! a fresh list and nothing mutates a gap after it is created.

use serde::{Deserialize, Serialize};

/// One of the four independent quality axes.
///
/// Declaration order is the healing priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Structural validity
    Power,
    /// Correctness and convention
    Justice,
    /// Surface hygiene
    Love,
    /// Self-description and robustness
    Wisdom,
}

impl Dimension {
    /// All dimensions in priority order
    pub const ALL: [Dimension; 4] = [
        Dimension::Power,
        Dimension::Justice,
        Dimension::Love,
        Dimension::Wisdom,
    ];

    /// Priority rank, 0 is the most urgent
    pub fn priority(self) -> u8 {
        match self {
            Dimension::Power => 0,
            Dimension::Justice => 1,
            Dimension::Love => 2,
            Dimension::Wisdom => 3,
        }
    }

    /// Single-letter tag used in compact reports
    pub fn letter(self) -> char {
        match self {
            Dimension::Power => 'P',
            Dimension::Justice => 'J',
            Dimension::Love => 'L',
            Dimension::Wisdom => 'W',
        }
    }

    /// Human-readable label with the quality it stands for
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Power => "POWER (structure)",
            Dimension::Justice => "JUSTICE (correctness)",
            Dimension::Love => "LOVE (hygiene)",
            Dimension::Wisdom => "WISDOM (documentation)",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::Power => write!(f, "power"),
            Dimension::Justice => write!(f, "justice"),
            Dimension::Love => write!(f, "love"),
            Dimension::Wisdom => write!(f, "wisdom"),
        }
    }
}

/// Closed catalog of gap kinds. Each kind belongs to exactly one dimension.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GapKind {
    MissingBlockTerminator,
    UnclosedLiteral,
    UnbalancedBracket,
    SyntaxError,
    NamingConventionViolation,
    HighComplexity,
    TrailingWhitespace,
    LineTooLong,
    MixedIndentation,
    UnusedImport,
    MissingDocBlock,
    BroadExceptionClause,
}

impl GapKind {
    pub const ALL: [GapKind; 12] = [
        GapKind::MissingBlockTerminator,
        GapKind::UnclosedLiteral,
        GapKind::UnbalancedBracket,
        GapKind::SyntaxError,
        GapKind::NamingConventionViolation,
        GapKind::HighComplexity,
        GapKind::TrailingWhitespace,
        GapKind::LineTooLong,
        GapKind::MixedIndentation,
        GapKind::UnusedImport,
        GapKind::MissingDocBlock,
        GapKind::BroadExceptionClause,
    ];

    pub fn dimension(self) -> Dimension {
        match self {
            GapKind::MissingBlockTerminator
            | GapKind::UnclosedLiteral
            | GapKind::UnbalancedBracket
            | GapKind::SyntaxError => Dimension::Power,
            GapKind::NamingConventionViolation | GapKind::HighComplexity => Dimension::Justice,
            GapKind::TrailingWhitespace
            | GapKind::LineTooLong
            | GapKind::MixedIndentation
            | GapKind::UnusedImport => Dimension::Love,
            GapKind::MissingDocBlock | GapKind::BroadExceptionClause => Dimension::Wisdom,
        }
    }

    /// Whether fixing this kind changes the number of lines in the file
    pub fn reshapes_lines(self) -> bool {
        matches!(self, GapKind::LineTooLong | GapKind::MissingDocBlock)
    }
}

impl std::fmt::Display for GapKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GapKind::MissingBlockTerminator => "missing-block-terminator",
            GapKind::UnclosedLiteral => "unclosed-literal",
            GapKind::UnbalancedBracket => "unbalanced-bracket",
            GapKind::SyntaxError => "syntax-error",
            GapKind::NamingConventionViolation => "naming-convention",
            GapKind::HighComplexity => "high-complexity",
            GapKind::TrailingWhitespace => "trailing-whitespace",
            GapKind::LineTooLong => "line-too-long",
            GapKind::MixedIndentation => "mixed-indentation",
            GapKind::UnusedImport => "unused-import",
            GapKind::MissingDocBlock => "missing-doc-block",
            GapKind::BroadExceptionClause => "broad-exception",
        };
        f.write_str(name)
    }
}

/// How much trust the detector places in a gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    #[default]
    Exact,
    /// Reported by the lexical fallback after the structural parse failed
    BestEffort,
}

/// Position of a gap in the source.
///
/// `line` is 1-based, `column` is a 0-based character offset. `end_line` is
/// set for gaps spanning several lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            line,
            column,
            end_line: None,
        }
    }

    pub fn spanning(line: usize, column: usize, end_line: usize) -> Self {
        Self {
            line,
            column,
            end_line: (end_line > line).then_some(end_line),
        }
    }

    /// Last line touched by the gap. Edits are ordered on this line.
    pub fn anchor_line(&self) -> usize {
        self.end_line.unwrap_or(self.line)
    }
}

/// Machine-readable payload the transformer needs to repair a gap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FixHint {
    /// Insert `text` at character `column` of the gap's line
    Insert { column: usize, text: String },
    /// Insert a documentation block after the anchor line using `indent`
    DocBlock { indent: String },
    /// Conventional spelling of a badly named declaration (never applied)
    Rename { suggestion: String },
}

/// A detected defect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub kind: GapKind,
    pub dimension: Dimension,
    pub severity: f64,
    pub location: Location,
    pub fixable: bool,
    #[serde(default)]
    pub confidence: Confidence,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<FixHint>,
}

impl Gap {
    /// Create a gap; the dimension always follows from the kind
    pub fn new(
        kind: GapKind,
        severity: f64,
        location: Location,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            dimension: kind.dimension(),
            severity,
            location,
            fixable: false,
            confidence: Confidence::Exact,
            description: description.into(),
            hint: None,
        }
    }

    pub fn fixable(mut self, fixable: bool) -> Self {
        self.fixable = fixable;
        self
    }

    pub fn best_effort(mut self) -> Self {
        self.confidence = Confidence::BestEffort;
        self
    }

    pub fn with_hint(mut self, hint: FixHint) -> Self {
        self.hint = Some(hint);
        self
    }

    /// Healing priority: dimension, then descending severity, then location
    pub fn priority_cmp(&self, other: &Gap) -> std::cmp::Ordering {
        self.dimension
            .priority()
            .cmp(&other.dimension.priority())
            .then_with(|| other.severity.total_cmp(&self.severity))
            .then_with(|| self.location.cmp(&other.location))
    }
}

/// Result of one detection pass over one source text
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GapReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub gaps: Vec<Gap>,
    /// Physical line count, used to normalize size-dependent penalties
    pub line_count: usize,
    /// False when structural parsing failed and only best-effort Power gaps
    /// are present
    pub complete: bool,
}

impl GapReport {
    pub fn fixable_count(&self) -> usize {
        self.gaps.iter().filter(|g| g.fixable).count()
    }

    pub fn count_in(&self, dimension: Dimension) -> usize {
        self.gaps.iter().filter(|g| g.dimension == dimension).count()
    }

    /// Sum of severities, the raw fuel available to the healer
    pub fn total_severity(&self) -> f64 {
        self.gaps.iter().map(|g| g.severity).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.gaps.is_empty()
    }
}
