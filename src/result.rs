use thiserror::Error;

/// Main error type for the SQL stream loader
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Invalid UTF-8 in input at byte offset {offset}")]
    InvalidUtf8 { offset: u64 },
    #[error("Invalid configuration: expected {expected}, got {got}")]
    InvalidConfig { expected: String, got: String },

    // Structural errors: the statement cannot be safely rewritten
    #[error("Statement has no column list, cannot remove column '{column}' positionally")]
    MissingColumnList { column: String },
    #[error("VALUES clause not found: {0}")]
    MissingValuesClause(String),
    #[error("No '(' after VALUES: {0}")]
    MissingValuesList(String),
    #[error("Unbalanced parentheses, no matching ')' for '(' at byte {position}")]
    UnbalancedParentheses { position: usize },
    #[error("Column count and value count differ ({columns} vs {values})")]
    ColumnValueCountMismatch { columns: usize, values: usize },

    // Value-level errors: a single literal cannot be interpreted
    #[error("Unparseable timestamp: {0}")]
    UnparseableTimestamp(String),
    #[error("Unparseable date: {0}")]
    UnparseableDate(String),
    #[error("Malformed function call: {0}")]
    MalformedFunctionCall(String),
}

impl LoaderError {
    /// Helper to build an InvalidConfig error from anything string-like
    pub fn new_invalid_config(expected: impl Into<String>, got: impl Into<String>) -> Self {
        LoaderError::InvalidConfig {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// True for failures to locate a syntactic landmark of an INSERT statement
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            LoaderError::MissingColumnList { .. }
                | LoaderError::MissingValuesClause(_)
                | LoaderError::MissingValuesList(_)
                | LoaderError::UnbalancedParentheses { .. }
                | LoaderError::ColumnValueCountMismatch { .. }
        )
    }

    /// True for failures localized to one literal value
    pub fn is_value_level(&self) -> bool {
        matches!(
            self,
            LoaderError::UnparseableTimestamp(_)
                | LoaderError::UnparseableDate(_)
                | LoaderError::MalformedFunctionCall(_)
        )
    }
}

/// Type alias for Results using LoaderError
pub type Result<T> = std::result::Result<T, LoaderError>;
