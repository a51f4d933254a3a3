//! Loader-specific types for parents table processing.

use thiserror::Error;

/// Errors that can occur while loading or resolving a parents table.
#[derive(Error, Debug)]
pub enum HierarchyError {
    /// I/O error reading the parents file.
    #[error("IO error reading parents file: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error while exporting a table.
    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed line in the parents file.
    #[error("Format error on line {line}: {reason} (`{content}`)")]
    Format {
        /// 1-based line number.
        line: usize,
        /// Raw text of the offending line.
        content: String,
        /// What is wrong with the line.
        reason: String,
    },

    /// A group references itself, directly or through other groups.
    #[error("Cyclic group reference: {}", chain.join(" -> "))]
    CyclicGroup {
        /// Group names along the cycle, first name repeated at the end.
        chain: Vec<String>,
    },

    /// A parent or group references a group that is not defined.
    #[error("Unknown group '{name}' referenced by '{referenced_by}'")]
    UnknownGroup {
        /// The missing group name.
        name: String,
        /// The parent or group holding the reference.
        referenced_by: String,
    },

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Directory not found.
    #[error("Directory not found: {path}")]
    DirectoryNotFound {
        /// The path that was not found.
        path: String,
    },
}

impl HierarchyError {
    /// Creates a format error for the given line.
    pub fn format(line: usize, content: &str, reason: impl Into<String>) -> Self {
        Self::Format {
            line,
            content: content.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns the line number for format errors.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Format { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Result type for parents table operations.
pub type HierarchyResult<T> = Result<T, HierarchyError>;

/// What to do when a part is listed more than once in the same list.
///
/// Duplicates are never an error; the resolved child set always holds
/// each part once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Merge duplicates silently.
    #[default]
    Merge,
    /// Merge duplicates and log a warning for each.
    Warn,
}

/// Configuration for loading and applying a parents table.
#[derive(Debug, Clone)]
pub struct HierarchyConfig {
    /// Handling of repeated entries inside one group or parent.
    pub duplicates: DuplicatePolicy,
    /// LDraw units to scene units.
    pub scale_factor: f64,
    /// Maximum distance, in LDraw units, between a child and an attach point.
    pub tolerance_ldu: f64,
}

impl HierarchyConfig {
    /// Scene units per LDraw unit at real-world LEGO scale.
    pub const REAL_SCALE: f64 = 0.0004;

    /// Creates a config that logs every duplicate entry.
    pub fn strict() -> Self {
        Self {
            duplicates: DuplicatePolicy::Warn,
            ..Self::default()
        }
    }
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            duplicates: DuplicatePolicy::Merge,
            scale_factor: Self::REAL_SCALE,
            tolerance_ldu: 5.0,
        }
    }
}

/// Statistics from parsing a parents file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Total lines read.
    pub total_lines: usize,
    /// Blank and comment-only lines.
    pub skipped_lines: usize,
    /// Group blocks.
    pub group_count: usize,
    /// Parent blocks.
    pub parent_count: usize,
    /// Attach point lines.
    pub attach_point_count: usize,
    /// Child and member lines.
    pub entry_count: usize,
    /// Entries repeating an earlier entry of the same block, plus parts
    /// merged away during resolution when parsed through
    /// [`PartsHierarchy::parse`](crate::PartsHierarchy::parse).
    pub duplicate_entries: usize,
    /// Time taken to parse in milliseconds.
    pub parse_time_ms: u64,
}

impl ParseStats {
    /// Returns the number of lines that carried data or headers.
    pub fn data_lines(&self) -> usize {
        self.total_lines - self.skipped_lines
    }
}
