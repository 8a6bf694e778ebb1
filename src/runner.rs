use crate::{
    binding::{PreparedInsert, contains_large_string_literal, prepare_insert},
    config::LoaderConfig,
    reader::{StatementReader, count_insert_statements},
    rewriter::remove_column,
    scanner::Statement,
};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// Trait for executing loaded statements against a database backend.
/// Each call runs in its own transaction, rolled back on failure.
pub trait StatementExecutor {
    /// Execute a batch of literal statements, returning the number that succeeded
    fn execute_batch(&mut self, statements: &[String]) -> anyhow::Result<usize>;

    /// Execute one parameterized INSERT
    fn execute_prepared(&mut self, insert: &PreparedInsert) -> anyhow::Result<()>;
}

/// Outcome counters of a load run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub executed: u64,
    pub failed: u64,
    /// INSERT statements found by the pre-scan, zero when no pre-scan ran
    pub total_statements: u64,
}

/// Drives statements from a SQL stream into a [`StatementExecutor`].
///
/// Only INSERT statements are executed. With `ignore_pk` the configured column is removed
/// first; statements carrying an oversized string literal go through the parameterized
/// path, everything else is batched.
pub struct Loader<E: StatementExecutor> {
    config: LoaderConfig,
    executor: E,
    batch: Vec<String>,
    summary: LoadSummary,
    total_bytes: Option<u64>,
    last_progress: Instant,
}

impl<E: StatementExecutor> Loader<E> {
    pub fn new(config: LoaderConfig, executor: E) -> Self {
        let batch = Vec::with_capacity(config.batch_size);
        Loader {
            config,
            executor,
            batch,
            summary: LoadSummary::default(),
            total_bytes: None,
            last_progress: Instant::now(),
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn into_executor(self) -> E {
        self.executor
    }

    pub fn summary(&self) -> LoadSummary {
        self.summary
    }

    /// Pre-scan the file to count INSERT statements, then load it with a fresh reader
    pub fn run_file(&mut self, path: impl AsRef<Path>) -> anyhow::Result<LoadSummary> {
        let path = path.as_ref();
        let total_bytes = std::fs::metadata(path)?.len();
        info!(path = %path.display(), total_bytes, "pre-scanning statements");

        let total = count_insert_statements(File::open(path)?, self.config.chunk_size)?;
        info!(total_statements = total, "pre-scan complete");

        self.summary.total_statements = total;
        self.total_bytes = Some(total_bytes);
        let started = Instant::now();
        let summary = self.run(File::open(path)?)?;

        info!(
            executed = summary.executed,
            failed = summary.failed,
            total_statements = summary.total_statements,
            elapsed_secs = started.elapsed().as_secs(),
            "load complete"
        );
        Ok(summary)
    }

    /// Load every statement of `reader`, flushing the final partial batch at the end
    pub fn run<R: Read>(&mut self, reader: R) -> anyhow::Result<LoadSummary> {
        let mut statements = StatementReader::with_chunk_size(reader, self.config.chunk_size);
        while let Some(statement) = statements.next() {
            self.handle_statement(statement?)?;
            self.log_progress(statements.bytes_read());
        }
        self.flush_batch()?;
        Ok(self.summary)
    }

    /// Route one statement to the batch or the parameterized path
    pub fn handle_statement(&mut self, statement: Statement) -> anyhow::Result<()> {
        if !statement.is_insert() {
            debug!(statement = %statement, "skipping non-INSERT statement");
            return Ok(());
        }

        let sql = if self.config.ignore_pk {
            match remove_column(statement.as_str(), &self.config.pk_name) {
                Ok(sql) => sql,
                Err(e) if self.config.continue_on_error => {
                    warn!(error = %e, pk_name = %self.config.pk_name, "cannot remove column, statement skipped");
                    self.summary.failed += 1;
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            statement.into_string()
        };

        if contains_large_string_literal(&sql, &self.config.large_literal) {
            debug!(sql_len = sql.len(), "oversized string literal, executing as parameterized statement");
            self.flush_batch()?;
            self.execute_prepared(&sql)
        } else {
            self.batch.push(sql);
            if self.batch.len() >= self.config.batch_size {
                self.flush_batch()?;
            }
            Ok(())
        }
    }

    /// Execute the pending batch, if any
    pub fn flush_batch(&mut self) -> anyhow::Result<()> {
        if self.batch.is_empty() {
            return Ok(());
        }
        let batch = std::mem::take(&mut self.batch);
        debug!(batch_size = batch.len(), "executing batch");

        match self.executor.execute_batch(&batch) {
            Ok(succeeded) => {
                self.summary.executed += succeeded as u64;
                Ok(())
            }
            Err(e) if self.config.continue_on_error => {
                warn!(error = %e, statements = batch.len(), "batch failed and was rolled back");
                self.summary.failed += batch.len() as u64;
                Ok(())
            }
            Err(e) => Err(e.context(format!("batch of {} statements failed", batch.len()))),
        }
    }

    fn execute_prepared(&mut self, sql: &str) -> anyhow::Result<()> {
        let result = prepare_insert(sql, &self.config.large_literal)
            .map_err(anyhow::Error::from)
            .and_then(|prepared| self.executor.execute_prepared(&prepared));

        match result {
            Ok(()) => {
                self.summary.executed += 1;
                Ok(())
            }
            Err(e) if self.config.continue_on_error => {
                warn!(error = %e, "parameterized statement failed");
                self.summary.failed += 1;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn log_progress(&mut self, bytes_read: u64) {
        if self.last_progress.elapsed() < PROGRESS_INTERVAL {
            return;
        }
        self.last_progress = Instant::now();
        let read_pct = match self.total_bytes {
            Some(total) if total > 0 => (bytes_read * 100 / total).min(100),
            _ => 0,
        };
        let write_pct = match self.summary.total_statements {
            0 => 0,
            total => (self.summary.executed * 100 / total).min(100),
        };
        info!(
            bytes_read,
            read_pct,
            executed = self.summary.executed,
            total_statements = self.summary.total_statements,
            write_pct,
            "load progress"
        );
    }
}
