//! dbscope - command line SQLite database inspector

mod render;

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use dbscope_browse::{ContentArgs, ContentSession, DropOutcome, PragmaArgs, PragmaInspector};
use dbscope_bus::EventBus;
use dbscope_core::{PragmaKind, SchemaType};
use dbscope_sqlite::{catalog, SqliteConnection};
use dbscope_store::Store;

#[derive(Parser)]
#[command(name = "dbscope", version, about = "Inspect SQLite database files")]
struct Cli {
    /// Directory holding imported databases
    #[arg(long, env = "DBSCOPE_STORE", global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List databases in the store
    List {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Copy database files into the store
    Import {
        /// Source files to import
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Delete a database (and its journal sidecars) from the store
    Remove {
        /// Database file name within the store
        name: String,
    },
    /// List schema objects of a database
    Schema {
        /// Database name in the store, or a path to a file
        database: String,
        /// Restrict to one object kind
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Page through the contents of a table, view or trigger
    Content {
        /// Database name in the store, or a path to a file
        database: String,
        /// Schema object to view
        name: String,
        /// Object kind
        #[arg(long, value_enum, default_value = "table")]
        kind: KindArg,
        /// Rows per fetched page
        #[arg(long)]
        page_size: Option<usize>,
        /// Empty a table / drop a view or trigger instead of viewing it
        #[arg(long)]
        drop: bool,
    },
    /// Show a table's introspection pragmas
    Pragma {
        /// Database name in the store, or a path to a file
        database: String,
        /// Table to inspect
        table: String,
        /// Show a single tab instead of all three
        #[arg(long, value_enum)]
        tab: Option<TabArg>,
    },
    /// Show database file details
    Info {
        /// Database name in the store, or a path to a file
        database: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Table,
    View,
    Trigger,
}

impl From<KindArg> for SchemaType {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Table => SchemaType::Table,
            KindArg::View => SchemaType::View,
            KindArg::Trigger => SchemaType::Trigger,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum TabArg {
    TableInfo,
    ForeignKeys,
    Indexes,
}

impl From<TabArg> for PragmaKind {
    fn from(tab: TabArg) -> Self {
        match tab {
            TabArg::TableInfo => PragmaKind::TableInfo,
            TabArg::ForeignKeys => PragmaKind::ForeignKeys,
            TabArg::Indexes => PragmaKind::Indexes,
        }
    }
}

fn store_root(cli_store: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(root) = cli_store {
        return Ok(root);
    }
    let base = dirs::data_dir().context("could not determine a data directory")?;
    Ok(base.join("dbscope"))
}

/// Ctrl-C flips the token; every long-running operation races it.
fn cancellation_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling");
            trigger.cancel();
        }
    });
    token
}

/// Resolve a database argument: an existing path wins, otherwise the
/// name is looked up in the store.
async fn resolve_database(store: &Store, database: &str) -> anyhow::Result<PathBuf> {
    let direct = PathBuf::from(database);
    if direct.is_file() {
        return Ok(direct);
    }
    let found = store.find().await?;
    found
        .into_iter()
        .find(|d| d.name == database)
        .map(|d| d.path)
        .with_context(|| format!("no database '{database}' in the store"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = Store::open(store_root(cli.store)?).await?;

    match cli.command {
        Command::List { json } => list(&store, json).await,
        Command::Import { files } => import(&store, files).await,
        Command::Remove { name } => {
            store.remove(&name).await?;
            println!("removed {name}");
            Ok(())
        }
        Command::Schema {
            database,
            kind,
            json,
        } => schema(&store, &database, kind.map(Into::into), json).await,
        Command::Content {
            database,
            name,
            kind,
            page_size,
            drop,
        } => content(&store, &database, &name, kind.into(), page_size, drop).await,
        Command::Pragma {
            database,
            table,
            tab,
        } => pragma(&store, &database, &table, tab.map(Into::into)).await,
        Command::Info { database } => info(&store, &database).await,
    }
}

async fn list(store: &Store, json: bool) -> anyhow::Result<()> {
    let databases = store.find().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&databases)?);
    } else if databases.is_empty() {
        println!("store is empty: {}", store.root().display());
    } else {
        println!("{}", render::databases_table(&databases));
    }
    Ok(())
}

async fn import(store: &Store, files: Vec<PathBuf>) -> anyhow::Result<()> {
    let token = cancellation_on_ctrl_c();
    let report = store.import(&files, &token).await?;

    for database in &report.imported {
        println!("imported {} ({} bytes)", database.name, database.size_bytes);
    }
    for (source, reason) in &report.failed {
        eprintln!("skipped {}: {reason}", source.display());
    }
    if report.cancelled {
        bail!("import interrupted");
    }
    if !report.failed.is_empty() {
        bail!("{} of {} files failed", report.failed.len(), files.len());
    }
    Ok(())
}

async fn schema(
    store: &Store,
    database: &str,
    kind: Option<SchemaType>,
    json: bool,
) -> anyhow::Result<()> {
    let path = resolve_database(store, database).await?;
    let conn = SqliteConnection::open(&path)?;

    let kinds: Vec<SchemaType> = match kind {
        Some(k) => vec![k],
        None => SchemaType::ALL.to_vec(),
    };

    let mut objects = Vec::new();
    for k in kinds {
        objects.extend(catalog::list_objects(&conn, k).await?);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&objects)?);
    } else if objects.is_empty() {
        println!("no schema objects");
    } else {
        println!("{}", render::objects_table(&objects));
    }
    Ok(())
}

async fn content(
    store: &Store,
    database: &str,
    name: &str,
    kind: SchemaType,
    page_size: Option<usize>,
    drop: bool,
) -> anyhow::Result<()> {
    let path = resolve_database(store, database).await?;
    let conn: Arc<SqliteConnection> = Arc::new(SqliteConnection::open(&path)?);

    let args = ContentArgs {
        database_name: database.to_string(),
        database_path: path,
        schema_name: name.to_string(),
        kind,
    };
    let mut session = ContentSession::new(conn, EventBus::new(), args);
    if let Some(page_size) = page_size {
        session = session.with_page_size(page_size);
    }

    if drop {
        return match session.drop_object().await? {
            DropOutcome::Cleared { deleted_rows } => {
                println!("cleared {name}: {deleted_rows} rows deleted");
                Ok(())
            }
            DropOutcome::Closed => {
                println!("dropped {name}");
                Ok(())
            }
        };
    }

    let headers = session.load().await?.to_vec();
    let token = cancellation_on_ctrl_c();
    let count = session.query(&token).await?;

    println!("{}", render::rows_table(&headers, session.rows()));
    if token.is_cancelled() {
        eprintln!("cancelled after {count} rows");
    } else {
        println!("{count} rows");
    }
    Ok(())
}

async fn pragma(
    store: &Store,
    database: &str,
    table: &str,
    tab: Option<PragmaKind>,
) -> anyhow::Result<()> {
    let path = resolve_database(store, database).await?;
    let conn = Arc::new(SqliteConnection::open(&path)?);

    let args = PragmaArgs {
        database_path: path,
        table_name: table.to_string(),
    };
    let mut inspector = PragmaInspector::new(conn, &args)?;
    let token = cancellation_on_ctrl_c();

    let kinds: Vec<PragmaKind> = match tab {
        Some(kind) => vec![kind],
        None => PragmaKind::ALL.to_vec(),
    };

    for kind in kinds {
        let shown = inspector.show(kind, &token).await?;
        println!("{}", kind.label());
        println!("{}", render::pragma_table(shown));
    }
    Ok(())
}

async fn info(store: &Store, database: &str) -> anyhow::Result<()> {
    let path = resolve_database(store, database).await?;
    let conn = SqliteConnection::open(&path)?;
    let details = conn.database_info()?;

    println!("{}", render::info_table(&path, &details));
    Ok(())
}
