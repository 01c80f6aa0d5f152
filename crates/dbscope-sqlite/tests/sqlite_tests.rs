//! Integration tests for the SQLite access layer

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use dbscope_core::{Connection, PragmaKind, SchemaType};
use dbscope_sqlite::{
    catalog, PageSource, Pager, SqliteConnection,
};

/// Helper to create an in-memory database with sample schema
async fn setup_test_database() -> SqliteConnection {
    let conn = SqliteConnection::open_in_memory().expect("Failed to open in-memory database");

    let statements = vec![
        r#"CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            balance REAL DEFAULT 0.0
        )"#,
        r#"CREATE TABLE orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            total_price REAL NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )"#,
        "CREATE INDEX idx_users_email ON users(email)",
        r#"CREATE VIEW order_summary AS
        SELECT o.id, u.username, o.total_price
        FROM orders o JOIN users u ON o.user_id = u.id"#,
        r#"CREATE TRIGGER touch_user
        AFTER INSERT ON orders
        BEGIN
            UPDATE users SET balance = balance + NEW.total_price WHERE id = NEW.user_id;
        END"#,
    ];

    for statement in statements {
        conn.execute(statement)
            .await
            .expect("Failed to setup schema");
    }

    conn
}

async fn insert_users(conn: &SqliteConnection, count: usize) {
    for i in 1..=count {
        conn.execute(&format!(
            "INSERT INTO users (username, email, balance) VALUES ('user{i}', 'user{i}@example.com', {i}.0)"
        ))
        .await
        .expect("Failed to insert user");
    }
}

#[tokio::test]
async fn test_open_missing_file_fails() {
    let result = SqliteConnection::open("/nonexistent/directory/database.db");
    assert!(result.is_err(), "Should fail when the file does not exist");
}

#[tokio::test]
async fn test_open_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(format!("scope_{}.db", uuid::Uuid::new_v4()));

    // Seed a database file; the inspector only ever opens existing ones
    rusqlite::Connection::open(&path)
        .unwrap()
        .execute_batch("CREATE TABLE t (id INTEGER)")
        .unwrap();

    let conn = SqliteConnection::open(&path).expect("Failed to open existing database");
    let tables = catalog::list_objects(&conn, SchemaType::Table)
        .await
        .unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].name, "t");
}

#[tokio::test]
async fn test_database_info() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("info.db");
    rusqlite::Connection::open(&path)
        .unwrap()
        .execute_batch("CREATE TABLE t (id INTEGER)")
        .unwrap();

    let conn = SqliteConnection::open(&path).unwrap();
    let info = conn.database_info().expect("Failed to get database info");

    assert!(info.page_count > 0, "Database should have pages");
    assert!(info.file_size_bytes > 0, "Database should have a size");
    assert_eq!(info.encoding, "UTF-8");
    assert!(info.foreign_keys_enabled);
}

#[tokio::test]
async fn test_catalog_lists_tables_ordered() {
    let conn = setup_test_database().await;

    let tables = catalog::list_objects(&conn, SchemaType::Table)
        .await
        .expect("Failed to list tables");

    let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["orders", "users"], "sorted, sqlite_% excluded");
    assert!(tables.iter().all(|t| t.kind == SchemaType::Table));
}

#[tokio::test]
async fn test_catalog_lists_views_and_triggers() {
    let conn = setup_test_database().await;

    let views = catalog::list_objects(&conn, SchemaType::View).await.unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].name, "order_summary");
    assert!(views[0].sql.is_some(), "View should carry its definition");

    let triggers = catalog::list_objects(&conn, SchemaType::Trigger)
        .await
        .unwrap();
    assert_eq!(triggers.len(), 1);
    assert_eq!(triggers[0].name, "touch_user");
}

#[tokio::test]
async fn test_find_object() {
    let conn = setup_test_database().await;

    let found = catalog::find_object(&conn, SchemaType::Table, "users")
        .await
        .unwrap();
    assert!(found.is_some());

    let missing = catalog::find_object(&conn, SchemaType::Table, "ghosts")
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_foreign_key_pragma_native_column_order() {
    let conn = setup_test_database().await;

    let result = catalog::pragma(&conn, PragmaKind::ForeignKeys, "orders")
        .await
        .expect("Failed to run foreign_key_list");

    // The fixed header set must match what SQLite actually returns,
    // position for position.
    assert_eq!(result.columns, PragmaKind::ForeignKeys.columns());
    assert_eq!(result.rows.len(), 1);

    let row = &result.rows[0];
    assert_eq!(row.get(2).unwrap().as_str(), Some("users"));
    assert_eq!(row.get(3).unwrap().as_str(), Some("user_id"));
    assert_eq!(row.get(4).unwrap().as_str(), Some("id"));
    assert_eq!(row.get(6).unwrap().as_str(), Some("CASCADE"));
}

#[tokio::test]
async fn test_table_info_pragma_native_column_order() {
    let conn = setup_test_database().await;

    let result = catalog::pragma(&conn, PragmaKind::TableInfo, "users")
        .await
        .unwrap();

    assert_eq!(result.columns, PragmaKind::TableInfo.columns());
    assert_eq!(result.rows.len(), 4, "users has 4 columns");
    assert_eq!(result.rows[0].get(1).unwrap().as_str(), Some("id"));
    assert_eq!(result.rows[0].get(5).unwrap().as_i64(), Some(1), "id is pk");
}

#[tokio::test]
async fn test_index_list_pragma() {
    let conn = setup_test_database().await;

    let result = catalog::pragma(&conn, PragmaKind::Indexes, "users")
        .await
        .unwrap();

    assert_eq!(result.columns, PragmaKind::Indexes.columns());
    let names: Vec<Option<&str>> = result
        .rows
        .iter()
        .map(|r| r.get(1).and_then(|v| v.as_str()))
        .collect();
    assert!(names.contains(&Some("idx_users_email")));
}

#[tokio::test]
async fn test_column_names() {
    let conn = setup_test_database().await;

    let columns = catalog::column_names(&conn, "users").await.unwrap();
    assert_eq!(columns, vec!["id", "username", "email", "balance"]);
}

#[tokio::test]
async fn test_clear_table_leaves_empty_table() {
    let conn = setup_test_database().await;
    insert_users(&conn, 5).await;

    let deleted = catalog::clear_table(&conn, "users").await.unwrap();
    assert_eq!(deleted, 5);

    // Table persists, just empty
    let tables = catalog::list_objects(&conn, SchemaType::Table)
        .await
        .unwrap();
    assert!(tables.iter().any(|t| t.name == "users"));

    let rows = conn.query("SELECT COUNT(*) FROM users").await.unwrap();
    assert_eq!(rows.rows[0].get(0).unwrap().as_i64(), Some(0));

    // Clearing an already-empty table is a no-op
    let deleted = catalog::clear_table(&conn, "users").await.unwrap();
    assert_eq!(deleted, 0);
}

#[tokio::test]
async fn test_drop_object_is_idempotent() {
    let conn = setup_test_database().await;

    catalog::drop_object(&conn, SchemaType::Trigger, "touch_user")
        .await
        .expect("drop should succeed");
    let triggers = catalog::list_objects(&conn, SchemaType::Trigger)
        .await
        .unwrap();
    assert!(triggers.is_empty());

    // Dropping again, and dropping something that never existed,
    // are both no-ops.
    catalog::drop_object(&conn, SchemaType::Trigger, "touch_user")
        .await
        .expect("second drop should be a no-op");
    catalog::drop_object(&conn, SchemaType::View, "never_was")
        .await
        .expect("dropping an absent view should be a no-op");
}

#[tokio::test]
async fn test_pager_fetch_page_windows() {
    let conn = Arc::new(setup_test_database().await);
    insert_users(&conn, 25).await;

    let pager = Pager::new(conn, PageSource::Table("users".into())).with_page_size(10);

    let first = pager.fetch_page(0).await.unwrap();
    assert_eq!(first.rows.len(), 10);

    let last = pager.fetch_page(2).await.unwrap();
    assert_eq!(last.rows.len(), 5);

    let beyond = pager.fetch_page(3).await.unwrap();
    assert!(beyond.rows.is_empty());
}

#[tokio::test]
async fn test_pager_stream_traverses_all_pages() {
    let conn = Arc::new(setup_test_database().await);
    insert_users(&conn, 55).await;

    let pager = Pager::new(conn, PageSource::Table("users".into())).with_page_size(10);
    let mut stream = pager.stream(CancellationToken::new());

    let mut pages = Vec::new();
    while let Some(page) = stream.next().await {
        pages.push(page);
    }

    assert_eq!(pages.len(), 6);
    assert_eq!(pages.last().unwrap().rows.len(), 5);
    let total: usize = pages.iter().map(|p| p.rows.len()).sum();
    assert_eq!(total, 55);
}

#[tokio::test]
async fn test_pager_stream_empty_table_yields_single_empty_page() {
    let conn = Arc::new(setup_test_database().await);

    let pager = Pager::new(conn, PageSource::Table("users".into())).with_page_size(10);
    let mut stream = pager.stream(CancellationToken::new());

    let page = stream.next().await.expect("one page for the empty table");
    assert!(page.rows.is_empty());
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_pager_stream_cancelled_delivers_nothing() {
    let conn = Arc::new(setup_test_database().await);
    insert_users(&conn, 30).await;

    let token = CancellationToken::new();
    token.cancel();

    let pager = Pager::new(conn, PageSource::Table("users".into())).with_page_size(10);
    let mut stream = pager.stream(token);

    assert!(
        stream.next().await.is_none(),
        "no page may be delivered after cancellation"
    );
}

#[tokio::test]
async fn test_pager_stream_cancelled_midway_stops_delivery() {
    let conn = Arc::new(setup_test_database().await);
    insert_users(&conn, 30).await;

    let token = CancellationToken::new();
    let pager = Pager::new(conn, PageSource::Table("users".into())).with_page_size(10);
    let mut stream = pager.stream(token.clone());

    let first = stream.next().await.expect("first page arrives");
    assert_eq!(first.index, 0);

    // Give the producer time to buffer the next page into the channel,
    // then cancel. The buffered page must not come out.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    token.cancel();

    assert!(
        stream.next().await.is_none(),
        "a page buffered before cancellation must not be delivered after it"
    );
}

#[tokio::test]
async fn test_pager_pragma_source() {
    let conn = Arc::new(setup_test_database().await);

    let pager = Pager::new(
        conn,
        PageSource::Pragma(PragmaKind::ForeignKeys, "orders".into()),
    );
    let rows = pager.stream(CancellationToken::new()).collect_rows().await;

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get(2).unwrap().as_str(), Some("users"));
}
