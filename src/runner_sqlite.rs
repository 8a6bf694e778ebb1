use crate::{
    binding::{Binding, PreparedInsert},
    result::LoaderError,
    runner::StatementExecutor,
};
use rusqlite::Connection;
use rusqlite::types::{ToSql, ToSqlOutput, Value};

const SQLITE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f";
const SQLITE_DATE_FORMAT: &str = "%Y-%m-%d";

// SQLite has no temporal types: timestamps and dates are stored as ISO text
impl ToSql for Binding {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let output = match self {
            Binding::Null => ToSqlOutput::Owned(Value::Null),
            Binding::Timestamp(ts) => {
                ToSqlOutput::Owned(Value::Text(ts.format(SQLITE_TIMESTAMP_FORMAT).to_string()))
            }
            Binding::Date(d) => {
                ToSqlOutput::Owned(Value::Text(d.format(SQLITE_DATE_FORMAT).to_string()))
            }
            Binding::Text(s) | Binding::LargeText(s) => ToSqlOutput::from(s.as_str()),
            Binding::Long(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            Binding::Double(d) => ToSqlOutput::Owned(Value::Real(*d)),
        };
        Ok(output)
    }
}

/// Statement executor over a SQLite connection
pub struct SqliteExecutor {
    conn: Connection,
}

impl SqliteExecutor {
    pub fn new(conn: Connection) -> Self {
        SqliteExecutor { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_inner(self) -> Connection {
        self.conn
    }
}

impl StatementExecutor for SqliteExecutor {
    fn execute_batch(&mut self, statements: &[String]) -> anyhow::Result<usize> {
        // Dropping the transaction on an early return rolls it back
        let tx = self.conn.transaction().map_err(LoaderError::Sqlite)?;
        for sql in statements {
            tx.execute(sql, []).map_err(LoaderError::Sqlite)?;
        }
        tx.commit().map_err(LoaderError::Sqlite)?;
        Ok(statements.len())
    }

    fn execute_prepared(&mut self, insert: &PreparedInsert) -> anyhow::Result<()> {
        let tx = self.conn.transaction().map_err(LoaderError::Sqlite)?;
        tx.execute(
            &insert.sql,
            rusqlite::params_from_iter(insert.bindings.iter()),
        )
        .map_err(LoaderError::Sqlite)?;
        tx.commit().map_err(LoaderError::Sqlite)?;
        Ok(())
    }
}
