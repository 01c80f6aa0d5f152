//! Integration tests for content sessions and the pragma inspector

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use dbscope_browse::{
    ContentArgs, ContentSession, DropOutcome, PragmaArgs, PragmaInspector, SessionState,
};
use dbscope_bus::EventBus;
use dbscope_core::{Connection, Event, PragmaKind, SchemaType, Value};
use dbscope_sqlite::SqliteConnection;

async fn setup_test_database() -> Arc<SqliteConnection> {
    let conn = SqliteConnection::open_in_memory().expect("Failed to open in-memory database");

    let statements = vec![
        r#"CREATE TABLE notes (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            body TEXT
        )"#,
        "CREATE INDEX idx_notes_title ON notes(title)",
        "CREATE VIEW titled AS SELECT id, title FROM notes",
        r#"CREATE TRIGGER stamp_note
        AFTER UPDATE ON notes
        BEGIN
            SELECT 1;
        END"#,
    ];
    for statement in statements {
        conn.execute(statement).await.expect("Failed to setup schema");
    }
    for i in 1..=12 {
        conn.execute(&format!(
            "INSERT INTO notes (id, title, body) VALUES ({i}, 'note {i}', 'body {i}')"
        ))
        .await
        .expect("Failed to insert note");
    }

    Arc::new(conn)
}

fn content_args(name: &str, kind: SchemaType) -> ContentArgs {
    ContentArgs {
        database_name: "test.db".into(),
        database_path: ":memory:".into(),
        schema_name: name.into(),
        kind,
    }
}

#[tokio::test]
async fn test_table_session_loads_headers_then_rows() {
    let conn = setup_test_database().await;
    let mut session = ContentSession::new(
        conn,
        EventBus::new(),
        content_args("notes", SchemaType::Table),
    )
    .with_page_size(5);

    let headers = session.load().await.unwrap().to_vec();
    assert_eq!(headers, vec!["id", "title", "body"]);
    assert_eq!(*session.state(), SessionState::Loaded);

    let count = session.query(&CancellationToken::new()).await.unwrap();
    assert_eq!(count, 12);
    assert_eq!(*session.state(), SessionState::Displaying);
    assert_eq!(
        session.rows()[0].get(1),
        Some(&Value::Text("note 1".into()))
    );
}

#[tokio::test]
async fn test_requery_clears_previous_rows_first() {
    let conn = setup_test_database().await;
    let mut session = ContentSession::new(
        conn.clone(),
        EventBus::new(),
        content_args("notes", SchemaType::Table),
    );

    session.query(&CancellationToken::new()).await.unwrap();
    assert_eq!(session.rows().len(), 12);

    conn.execute("DELETE FROM notes WHERE id > 3").await.unwrap();

    // Fresh results replace the old ones, never append to them
    let count = session.query(&CancellationToken::new()).await.unwrap();
    assert_eq!(count, 3);
    assert_eq!(session.rows().len(), 3);
}

#[tokio::test]
async fn test_trigger_session_shows_sql_body() {
    let conn = setup_test_database().await;
    let mut session = ContentSession::new(
        conn,
        EventBus::new(),
        content_args("stamp_note", SchemaType::Trigger),
    );

    let headers = session.load().await.unwrap().to_vec();
    assert_eq!(headers, vec!["sql"]);

    session.query(&CancellationToken::new()).await.unwrap();
    assert_eq!(session.rows().len(), 1);
    let body = session.rows()[0].get(0).and_then(|v| v.as_str()).unwrap();
    assert!(body.contains("CREATE TRIGGER stamp_note"));
}

#[tokio::test]
async fn test_blank_arguments_make_an_inert_error_session() {
    let conn = setup_test_database().await;
    let mut session = ContentSession::new(
        conn,
        EventBus::new(),
        content_args("  ", SchemaType::Table),
    );

    assert!(matches!(session.state(), SessionState::Error(_)));
    assert!(session.load().await.is_err());
    assert!(session.query(&CancellationToken::new()).await.is_err());
    assert!(session.rows().is_empty());
}

#[tokio::test]
async fn test_missing_object_errors_on_load() {
    let conn = setup_test_database().await;
    let mut session = ContentSession::new(
        conn,
        EventBus::new(),
        content_args("no_such_table", SchemaType::Table),
    );

    assert!(session.load().await.is_err());
    assert!(matches!(session.state(), SessionState::Error(_)));
}

#[tokio::test]
async fn test_drop_table_clears_and_keeps_session_open() {
    let conn = setup_test_database().await;
    let mut session = ContentSession::new(
        conn.clone(),
        EventBus::new(),
        content_args("notes", SchemaType::Table),
    );
    session.query(&CancellationToken::new()).await.unwrap();

    let outcome = session.drop_object().await.unwrap();
    assert_eq!(outcome, DropOutcome::Cleared { deleted_rows: 12 });
    assert_eq!(*session.state(), SessionState::Dropped);
    assert!(session.rows().is_empty());

    // Still usable: the table exists, just empty
    let count = session.query(&CancellationToken::new()).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_drop_trigger_closes_session_and_publishes() {
    let conn = setup_test_database().await;
    let bus = EventBus::new();
    let mut sub = bus.subscribe();

    let mut session = ContentSession::new(
        conn.clone(),
        bus,
        content_args("stamp_note", SchemaType::Trigger),
    );

    let outcome = session.drop_object().await.unwrap();
    assert_eq!(outcome, DropOutcome::Closed);
    assert_eq!(*session.state(), SessionState::Closed);
    assert_eq!(sub.recv().await, Some(Event::RefreshTriggers));

    // A closed session refuses further work
    assert!(session.query(&CancellationToken::new()).await.is_err());

    let gone = conn
        .query("SELECT name FROM sqlite_master WHERE type = 'trigger'")
        .await
        .unwrap();
    assert!(gone.rows.is_empty());
}

#[tokio::test]
async fn test_drop_view_publishes_view_refresh() {
    let conn = setup_test_database().await;
    let bus = EventBus::new();
    let mut sub = bus.subscribe();

    let mut session =
        ContentSession::new(conn, bus, content_args("titled", SchemaType::View));

    assert_eq!(session.drop_object().await.unwrap(), DropOutcome::Closed);
    assert_eq!(sub.recv().await, Some(Event::RefreshViews));
}

#[tokio::test]
async fn test_pragma_tabs_are_independent_and_padded() {
    let conn = setup_test_database().await;
    let args = PragmaArgs {
        database_path: ":memory:".into(),
        table_name: "notes".into(),
    };
    let mut inspector = PragmaInspector::new(conn, &args).unwrap();
    let token = CancellationToken::new();

    // Tabs start empty until shown
    assert!(inspector.tab(PragmaKind::TableInfo).rows.is_empty());

    let info = inspector.show(PragmaKind::TableInfo, &token).await.unwrap();
    assert_eq!(info.headers, PragmaKind::TableInfo.columns());
    assert_eq!(info.rows.len(), 3);
    for row in &info.rows {
        assert_eq!(row.len(), PragmaKind::TableInfo.columns().len());
    }

    let indexes = inspector.show(PragmaKind::Indexes, &token).await.unwrap();
    assert!(indexes
        .rows
        .iter()
        .any(|r| r.get(1).and_then(|v| v.as_str()) == Some("idx_notes_title")));

    // Showing one tab never touched the others
    assert!(inspector.tab(PragmaKind::ForeignKeys).rows.is_empty());
    assert_eq!(inspector.tab(PragmaKind::TableInfo).rows.len(), 3);
}

#[tokio::test]
async fn test_pragma_inspector_rejects_blank_table() {
    let conn = setup_test_database().await;
    let args = PragmaArgs {
        database_path: ":memory:".into(),
        table_name: "".into(),
    };
    assert!(PragmaInspector::new(conn, &args).is_err());
}
