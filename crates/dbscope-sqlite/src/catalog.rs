//! Schema catalog and pragma introspection
//!
//! Everything here reads `sqlite_master` or the introspection pragmas
//! through a generic `Connection`, so it works against any conforming
//! driver and stays trivial to exercise in tests.

use dbscope_core::{Connection, PragmaKind, QueryResult, Result, SchemaObject, SchemaType};

/// List catalog entries of one kind, ordered by name.
///
/// SQLite-internal objects (`sqlite_%`) are excluded, matching what a
/// user expects to see in an inspector.
#[tracing::instrument(skip(conn))]
pub async fn list_objects(
    conn: &dyn Connection,
    kind: SchemaType,
) -> Result<Vec<SchemaObject>> {
    let sql = format!(
        "SELECT name, sql FROM sqlite_master WHERE type = '{}' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        kind.master_type()
    );
    let result = conn.query(&sql).await?;

    let objects = result
        .rows
        .iter()
        .filter_map(|row| {
            let name = row.get(0)?.as_str()?.to_string();
            let sql = row.get(1).and_then(|v| v.as_str()).map(|s| s.to_string());
            Some(SchemaObject { name, kind, sql })
        })
        .collect::<Vec<_>>();

    tracing::debug!(kind = %kind, count = objects.len(), "catalog listed");
    Ok(objects)
}

/// Look up a single catalog entry by name.
pub async fn find_object(
    conn: &dyn Connection,
    kind: SchemaType,
    name: &str,
) -> Result<Option<SchemaObject>> {
    let objects = list_objects(conn, kind).await?;
    Ok(objects.into_iter().find(|o| o.name == name))
}

/// Run one introspection pragma against `table`.
///
/// Column order in the result is the pragma's native order; callers
/// index by position.
#[tracing::instrument(skip(conn))]
pub async fn pragma(
    conn: &dyn Connection,
    kind: PragmaKind,
    table: &str,
) -> Result<QueryResult> {
    conn.query(&kind.statement(table)).await
}

/// Ordered column names of a table or view, via `PRAGMA table_info`.
pub async fn column_names(conn: &dyn Connection, table: &str) -> Result<Vec<String>> {
    let result = pragma(conn, PragmaKind::TableInfo, table).await?;
    // name is column 1 of table_info
    Ok(result
        .rows
        .iter()
        .filter_map(|row| row.get(1).and_then(|v| v.as_str()).map(|s| s.to_string()))
        .collect())
}

/// Delete all rows from `table`, leaving the table in place.
///
/// Returns the number of deleted rows; deleting from an already-empty
/// table is a successful no-op.
#[tracing::instrument(skip(conn))]
pub async fn clear_table(conn: &dyn Connection, table: &str) -> Result<u64> {
    conn.execute(&format!("DELETE FROM {}", quote_ident(table)))
        .await
}

/// Drop a schema object. Idempotent: dropping an absent object is a
/// no-op thanks to `IF EXISTS`.
#[tracing::instrument(skip(conn))]
pub async fn drop_object(conn: &dyn Connection, kind: SchemaType, name: &str) -> Result<()> {
    let sql = match kind {
        SchemaType::Table => format!("DROP TABLE IF EXISTS {}", quote_ident(name)),
        SchemaType::View => format!("DROP VIEW IF EXISTS {}", quote_ident(name)),
        SchemaType::Trigger => format!("DROP TRIGGER IF EXISTS {}", quote_ident(name)),
    };
    conn.execute(&sql).await?;
    Ok(())
}

/// Quote an identifier for use in SQL built from catalog names.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
