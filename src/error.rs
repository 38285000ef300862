//! Error types for the cellfreq library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum CellFreqError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A malformed or missing field at the load boundary.
    #[error("Validation error{}: {reason}", location(.row, .column))]
    Validation {
        /// 1-based data row, when the problem is tied to a row.
        row: Option<usize>,
        /// Column name, when the problem is tied to a column.
        column: Option<String>,
        reason: String,
    },

    #[error("Sample '{sample_id}' has zero total cell count; frequencies are undefined")]
    ZeroTotal { sample_id: String },

    #[error("Insufficient data: {group} group has {actual} sample(s), at least {required} required")]
    InsufficientData {
        group: String,
        actual: usize,
        required: usize,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

fn location(row: &Option<usize>, column: &Option<String>) -> String {
    match (row, column) {
        (Some(r), Some(c)) => format!(" at row {}, column '{}'", r, c),
        (Some(r), None) => format!(" at row {}", r),
        (None, Some(c)) => format!(" in column '{}'", c),
        (None, None) => String::new(),
    }
}

impl CellFreqError {
    /// Validation error not tied to a particular row.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            row: None,
            column: None,
            reason: reason.into(),
        }
    }

    /// Validation error for a field in a data row.
    pub fn invalid_field(row: usize, column: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            row: Some(row),
            column: Some(column.to_string()),
            reason: reason.into(),
        }
    }

    /// Process exit code for this error class.
    ///
    /// Validation, zero-total and insufficient-data failures each get their
    /// own code so callers can tell them apart.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } => 2,
            Self::ZeroTotal { .. } => 3,
            Self::InsufficientData { .. } => 4,
            Self::Io(_) | Self::Csv(_) => 5,
            Self::InvalidParameter(_) | Self::Numerical(_) | Self::Yaml(_) | Self::Json(_) => 1,
        }
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, CellFreqError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message() {
        let err = CellFreqError::invalid_field(3, "b_cell", "expected a non-negative integer");
        assert_eq!(
            err.to_string(),
            "Validation error at row 3, column 'b_cell': expected a non-negative integer"
        );

        let err = CellFreqError::validation("empty file");
        assert_eq!(err.to_string(), "Validation error: empty file");
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let validation = CellFreqError::validation("x").exit_code();
        let zero = CellFreqError::ZeroTotal {
            sample_id: "s1".into(),
        }
        .exit_code();
        let insufficient = CellFreqError::InsufficientData {
            group: "responder".into(),
            actual: 1,
            required: 2,
        }
        .exit_code();
        let io = CellFreqError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))
            .exit_code();

        let codes = [validation, zero, insufficient, io];
        for (i, a) in codes.iter().enumerate() {
            assert_ne!(*a, 0);
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
