//! Content viewer session
//!
//! One session shows one schema object's contents: the fixed header
//! row fetched once up front, then pages of rows streamed in below it.
//! Tables and views page through their rows; a trigger shows its SQL
//! body as a single-column grid.

use dbscope_bus::EventBus;
use dbscope_core::{Connection, DbscopeError, Event, Result, Row, SchemaType};
use dbscope_sqlite::{catalog, PageSource, Pager};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::args::ContentArgs;

/// What a drop request did, tagged so the caller needs no type
/// inspection to decide whether the session survives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Table contents deleted; the session stays open over an empty
    /// grid and can re-query.
    Cleared { deleted_rows: u64 },
    /// View or trigger dropped; the session is closed and a refresh
    /// event was published for the originating catalog.
    Closed,
}

/// Where the session is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    /// Headers fetched, no rows yet
    Loaded,
    /// A page stream is running
    Querying,
    /// Rows on screen
    Displaying,
    /// Table contents were cleared; still open, grid empty
    Dropped,
    /// View or trigger was dropped; terminal
    Closed,
    /// Bad arguments or a failed load; inert
    Error(String),
}

/// Viewer session over one table, view or trigger
pub struct ContentSession {
    conn: Arc<dyn Connection>,
    bus: EventBus,
    args: ContentArgs,
    state: SessionState,
    headers: Vec<String>,
    rows: Vec<Row>,
    page_size: Option<usize>,
}

impl ContentSession {
    /// Build a session. Malformed arguments put it straight into the
    /// `Error` state; no query is ever issued from there.
    pub fn new(conn: Arc<dyn Connection>, bus: EventBus, args: ContentArgs) -> Self {
        let state = match args.validate() {
            Ok(()) => SessionState::Uninitialized,
            Err(e) => {
                tracing::warn!(error = %e, "content session rejected its arguments");
                SessionState::Error(e.to_string())
            }
        };
        Self {
            conn,
            bus,
            args,
            state,
            headers: Vec::new(),
            rows: Vec::new(),
            page_size: None,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    fn ensure_open(&self) -> Result<()> {
        match &self.state {
            SessionState::Closed => Err(DbscopeError::Navigation(
                "session is closed".into(),
            )),
            SessionState::Error(reason) => {
                Err(DbscopeError::Navigation(reason.clone()))
            }
            _ => Ok(()),
        }
    }

    /// Fetch the grid headers, once.
    ///
    /// Tables and views use their `table_info` column names; a trigger
    /// gets a single `sql` column for its body.
    #[tracing::instrument(skip(self), fields(object = %self.args.schema_name))]
    pub async fn load(&mut self) -> Result<&[String]> {
        self.ensure_open()?;
        if self.state != SessionState::Uninitialized {
            return Ok(&self.headers);
        }

        let headers = match self.args.kind {
            SchemaType::Table | SchemaType::View => {
                match catalog::column_names(self.conn.as_ref(), &self.args.schema_name).await {
                    Ok(columns) if !columns.is_empty() => columns,
                    Ok(_) => {
                        let reason =
                            format!("no such object: {}", self.args.schema_name);
                        self.state = SessionState::Error(reason.clone());
                        return Err(DbscopeError::Schema(reason));
                    }
                    Err(e) => {
                        self.state = SessionState::Error(e.to_string());
                        return Err(e);
                    }
                }
            }
            SchemaType::Trigger => vec!["sql".to_string()],
        };

        self.headers = headers;
        self.state = SessionState::Loaded;
        Ok(&self.headers)
    }

    /// Run (or re-run) the paged query for this object.
    ///
    /// Displayed rows are cleared before the new stream starts, so
    /// stale and fresh rows never mix. Cancellation simply stops the
    /// stream; whatever arrived stays on screen.
    #[tracing::instrument(skip(self, token), fields(object = %self.args.schema_name))]
    pub async fn query(&mut self, token: &CancellationToken) -> Result<usize> {
        self.ensure_open()?;
        if self.state == SessionState::Uninitialized {
            self.load().await?;
        }

        self.rows.clear();
        self.state = SessionState::Querying;

        let source = match self.args.kind {
            SchemaType::Table | SchemaType::View => {
                PageSource::Table(self.args.schema_name.clone())
            }
            SchemaType::Trigger => PageSource::Sql(format!(
                "SELECT sql FROM sqlite_master WHERE type = 'trigger' AND name = '{}'",
                self.args.schema_name.replace('\'', "''")
            )),
        };

        let mut pager = Pager::new(Arc::clone(&self.conn), source);
        if let Some(page_size) = self.page_size {
            pager = pager.with_page_size(page_size);
        }

        let mut stream = pager.stream(token.clone());
        while let Some(page) = stream.next().await {
            self.rows.extend(page.rows);
        }

        self.state = SessionState::Displaying;
        tracing::debug!(rows = self.rows.len(), "content query finished");
        Ok(self.rows.len())
    }

    /// Drop the viewed object.
    ///
    /// A table is emptied rather than dropped and the session stays
    /// usable; a view or trigger is dropped outright, a refresh event
    /// goes out on the bus, and the session closes.
    #[tracing::instrument(skip(self), fields(object = %self.args.schema_name))]
    pub async fn drop_object(&mut self) -> Result<DropOutcome> {
        self.ensure_open()?;

        match self.args.kind {
            SchemaType::Table => {
                let deleted_rows =
                    catalog::clear_table(self.conn.as_ref(), &self.args.schema_name).await?;
                self.rows.clear();
                self.state = SessionState::Dropped;
                Ok(DropOutcome::Cleared { deleted_rows })
            }
            SchemaType::View => {
                catalog::drop_object(self.conn.as_ref(), SchemaType::View, &self.args.schema_name)
                    .await?;
                self.bus.publish(Event::RefreshViews);
                self.state = SessionState::Closed;
                Ok(DropOutcome::Closed)
            }
            SchemaType::Trigger => {
                catalog::drop_object(
                    self.conn.as_ref(),
                    SchemaType::Trigger,
                    &self.args.schema_name,
                )
                .await?;
                self.bus.publish(Event::RefreshTriggers);
                self.state = SessionState::Closed;
                Ok(DropOutcome::Closed)
            }
        }
    }
}
