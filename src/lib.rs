pub mod binding;
pub mod config;
pub mod literal;
pub mod reader;
pub mod result;
pub mod rewriter;
pub mod runner;
#[cfg(feature = "sqlite")]
pub mod runner_sqlite;
pub mod scanner;
pub mod str_utils;
pub mod timestamp;

// Re-export types for convenience
pub use binding::{Binding, LargeLiteralPolicy, PreparedInsert, prepare_insert};
pub use config::LoaderConfig;
pub use literal::{Literal, Number, classify_value};
pub use reader::{StatementReader, count_insert_statements};
pub use result::{LoaderError, Result};
pub use rewriter::{normalize_date_literals, remove_column};
pub use runner::{LoadSummary, Loader, StatementExecutor};
pub use scanner::{ScanState, Scanner, Statement, split_sql_statements};
pub use str_utils::split_top_level;
pub use timestamp::CanonicalTimestamp;

// Re-export third-party types used in the public API to provide fallback for dependency conflicts
pub use chrono::{NaiveDate, NaiveDateTime};

#[cfg(feature = "sqlite")]
pub use runner_sqlite::SqliteExecutor;

// Re-export third-party types used in the public API to provide fallback for dependency conflicts
#[cfg(feature = "sqlite")]
pub use rusqlite::Connection as SqliteConnection;
