//! Cancellable paged-query producer
//!
//! A `Pager` turns one row source into a lazy sequence of bounded
//! pages fetched with `LIMIT`/`OFFSET` windows. Pages flow through a
//! bounded channel from a spawned producer that races every await
//! against a cancellation token, and the consumer checks the same
//! token before handing a page out, so once the token fires no
//! further page reaches the consumer, not even one already buffered
//! in the channel.

use dbscope_core::{Connection, PragmaKind, Result, Row};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::quote_ident;

/// Rows per page unless overridden
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// What a pager reads from
#[derive(Debug, Clone)]
pub enum PageSource {
    /// All rows of a table or view
    Table(String),
    /// One introspection pragma, via its table-valued function so
    /// `LIMIT`/`OFFSET` apply
    Pragma(PragmaKind, String),
    /// An arbitrary row-returning statement
    Sql(String),
}

impl PageSource {
    fn to_sql(&self) -> String {
        match self {
            PageSource::Table(name) => format!("SELECT * FROM {}", quote_ident(name)),
            PageSource::Pragma(kind, table) => {
                let func = match kind {
                    PragmaKind::TableInfo => "pragma_table_info",
                    PragmaKind::ForeignKeys => "pragma_foreign_key_list",
                    PragmaKind::Indexes => "pragma_index_list",
                };
                format!("SELECT * FROM {}('{}')", func, table.replace('\'', "''"))
            }
            PageSource::Sql(sql) => sql.clone(),
        }
    }
}

/// One page of query output
#[derive(Debug, Clone)]
pub struct Page {
    /// Zero-based page index
    pub index: usize,
    /// Rows in this page; fewer than the page size means last page
    pub rows: Vec<Row>,
}

/// Paged query over one row source
pub struct Pager {
    conn: Arc<dyn Connection>,
    source: PageSource,
    page_size: usize,
}

impl Pager {
    /// Create a pager with the default page size
    pub fn new(conn: Arc<dyn Connection>, source: PageSource) -> Self {
        Self {
            conn,
            source,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the page size (minimum 1)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Fetch a single page window.
    pub async fn fetch_page(&self, index: usize) -> Result<Page> {
        let sql = format!(
            "{} LIMIT {} OFFSET {}",
            self.source.to_sql(),
            self.page_size,
            index * self.page_size
        );
        let result = self.conn.query(&sql).await?;
        Ok(Page {
            index,
            rows: result.rows,
        })
    }

    /// Start producing pages until exhausted or cancelled.
    ///
    /// A fetch error ends the stream after logging it; the consumer
    /// simply sees no further pages.
    pub fn stream(&self, token: CancellationToken) -> PageStream {
        let (tx, rx) = mpsc::channel(1);
        let conn = Arc::clone(&self.conn);
        let source_sql = self.source.to_sql();
        let page_size = self.page_size;
        let producer_token = token.clone();

        tokio::spawn(async move {
            let token = producer_token;
            let mut index = 0usize;
            loop {
                let sql = format!(
                    "{} LIMIT {} OFFSET {}",
                    source_sql,
                    page_size,
                    index * page_size
                );

                let result = tokio::select! {
                    _ = token.cancelled() => {
                        tracing::debug!(page = index, "page stream cancelled before fetch");
                        break;
                    }
                    result = conn.query(&sql) => result,
                };

                let rows = match result {
                    Ok(r) => r.rows,
                    Err(e) => {
                        tracing::warn!(error = %e, page = index, "page fetch failed, ending stream");
                        break;
                    }
                };

                let exhausted = rows.len() < page_size;
                if rows.is_empty() && index > 0 {
                    break;
                }

                let page = Page { index, rows };
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::debug!(page = index, "page stream cancelled before delivery");
                        break;
                    }
                    sent = tx.send(page) => {
                        if sent.is_err() {
                            // Consumer dropped the stream
                            break;
                        }
                    }
                }

                if exhausted {
                    break;
                }
                index += 1;
            }
        });

        PageStream { rx, token }
    }
}

/// Consumer side of a page stream
pub struct PageStream {
    rx: mpsc::Receiver<Page>,
    token: CancellationToken,
}

impl PageStream {
    /// Receive the next page; `None` once the producer is done or the
    /// token has fired. The token is checked here too, so a page the
    /// producer buffered before cancellation is never handed out.
    pub async fn next(&mut self) -> Option<Page> {
        if self.token.is_cancelled() {
            self.rx.close();
            return None;
        }
        let page = tokio::select! {
            _ = self.token.cancelled() => None,
            page = self.rx.recv() => page,
        };
        if self.token.is_cancelled() {
            self.rx.close();
            return None;
        }
        page
    }

    /// Collect every remaining page's rows. Test and CLI convenience.
    pub async fn collect_rows(mut self) -> Vec<Row> {
        let mut rows = Vec::new();
        while let Some(page) = self.next().await {
            rows.extend(page.rows);
        }
        rows
    }
}

impl futures::Stream for PageStream {
    type Item = Page;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Page>> {
        if self.token.is_cancelled() {
            self.rx.close();
            return Poll::Ready(None);
        }
        match self.rx.poll_recv(cx) {
            Poll::Ready(Some(_)) if self.token.is_cancelled() => Poll::Ready(None),
            other => other,
        }
    }
}
