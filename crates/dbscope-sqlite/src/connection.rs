//! SQLite connection implementation

use async_trait::async_trait;
use dbscope_core::{
    Connection, DbscopeError, QueryCancelHandle, QueryResult, Result, Row, Value,
};
use parking_lot::Mutex;
use rusqlite::{Connection as RusqliteConnection, InterruptHandle, OpenFlags};
use std::path::Path;
use std::sync::Arc;

/// Cancel handle for SQLite queries.
///
/// Wraps the rusqlite `InterruptHandle`; can be called from any thread
/// to interrupt a running query, which then returns SQLITE_INTERRUPT.
pub struct SqliteCancelHandle {
    interrupt_handle: Arc<InterruptHandle>,
}

impl QueryCancelHandle for SqliteCancelHandle {
    fn cancel(&self) {
        tracing::debug!("interrupting SQLite query");
        self.interrupt_handle.interrupt();
    }
}

/// SQLite connection wrapper
pub struct SqliteConnection {
    conn: Arc<Mutex<RusqliteConnection>>,
    interrupt_handle: Arc<InterruptHandle>,
}

impl SqliteConnection {
    /// Open an existing SQLite database file.
    ///
    /// The file must already exist; the inspector never creates
    /// databases on open (import is the only way files appear).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "opening SQLite database");

        if !path.exists() {
            return Err(DbscopeError::NotFound(format!(
                "Database file does not exist: {}",
                path.display()
            )));
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = RusqliteConnection::open_with_flags(path, flags).map_err(|e| {
            DbscopeError::Connection(format!(
                "Failed to open SQLite database at '{}': {}",
                path.display(),
                e
            ))
        })?;

        conn.pragma_update(None, "foreign_keys", "ON").map_err(|e| {
            DbscopeError::Connection(format!("Failed to enable foreign keys: {}", e))
        })?;

        // Handle must be taken before the connection goes behind the Mutex
        let interrupt_handle = Arc::new(conn.get_interrupt_handle());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            interrupt_handle,
        })
    }

    /// Open an in-memory database. Test-oriented convenience.
    pub fn open_in_memory() -> Result<Self> {
        let conn = RusqliteConnection::open_in_memory().map_err(|e| {
            DbscopeError::Connection(format!("Failed to open in-memory database: {}", e))
        })?;
        let interrupt_handle = Arc::new(conn.get_interrupt_handle());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            interrupt_handle,
        })
    }

    /// Get database file information
    pub fn database_info(&self) -> Result<DatabaseFileInfo> {
        let conn = self.conn.lock();

        let page_count: i64 = conn
            .query_row("PRAGMA page_count", [], |row| row.get(0))
            .map_err(|e| DbscopeError::Query(e.to_string()))?;
        let page_size: i64 = conn
            .query_row("PRAGMA page_size", [], |row| row.get(0))
            .map_err(|e| DbscopeError::Query(e.to_string()))?;
        let encoding: String = conn
            .query_row("PRAGMA encoding", [], |row| row.get(0))
            .map_err(|e| DbscopeError::Query(e.to_string()))?;
        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .map_err(|e| DbscopeError::Query(e.to_string()))?;
        let foreign_keys: bool = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get::<_, i64>(0))
            .map_err(|e| DbscopeError::Query(e.to_string()))?
            != 0;

        Ok(DatabaseFileInfo {
            file_size_bytes: page_count * page_size,
            page_count: page_count as usize,
            page_size: page_size as usize,
            encoding,
            journal_mode,
            foreign_keys_enabled: foreign_keys,
        })
    }
}

/// Information about the SQLite database file
#[derive(Debug, Clone)]
pub struct DatabaseFileInfo {
    pub file_size_bytes: i64,
    pub page_count: usize,
    pub page_size: usize,
    pub encoding: String,
    pub journal_mode: String,
    pub foreign_keys_enabled: bool,
}

#[async_trait]
impl Connection for SqliteConnection {
    #[tracing::instrument(skip(self, sql), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn query(&self, sql: &str) -> Result<QueryResult> {
        let start_time = std::time::Instant::now();

        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| DbscopeError::Query(format!("Failed to prepare query: {}", e)))?;

        let column_count = stmt.column_count();
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();

        let mut rows = Vec::new();
        let mut query_rows = stmt
            .query([])
            .map_err(|e| DbscopeError::Query(format!("Failed to execute query: {}", e)))?;

        while let Some(row) = query_rows
            .next()
            .map_err(|e| DbscopeError::Query(format!("Failed to fetch row: {}", e)))?
        {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                values.push(rusqlite_to_value(row, i)?);
            }
            rows.push(Row::new(values));
        }

        let execution_time_ms = start_time.elapsed().as_millis() as u64;
        tracing::debug!(
            row_count = rows.len(),
            execution_time_ms,
            "query executed"
        );
        Ok(QueryResult {
            columns,
            rows,
            execution_time_ms,
        })
    }

    #[tracing::instrument(skip(self, sql), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn execute(&self, sql: &str) -> Result<u64> {
        let conn = self.conn.lock();
        let rows_affected = conn
            .execute(sql, [])
            .map_err(|e| DbscopeError::Query(format!("Failed to execute statement: {}", e)))?;

        tracing::debug!(affected_rows = rows_affected, "statement executed");
        Ok(rows_affected as u64)
    }

    fn cancel_handle(&self) -> Option<Arc<dyn QueryCancelHandle>> {
        Some(Arc::new(SqliteCancelHandle {
            interrupt_handle: self.interrupt_handle.clone(),
        }))
    }
}

/// Convert a rusqlite row value to our Value type
fn rusqlite_to_value(row: &rusqlite::Row, idx: usize) -> Result<Value> {
    use rusqlite::types::ValueRef;

    let value_ref = row
        .get_ref(idx)
        .map_err(|e| DbscopeError::Query(e.to_string()))?;

    let value = match value_ref {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(s) => Value::Text(String::from_utf8_lossy(s).to_string()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    };

    Ok(value)
}
