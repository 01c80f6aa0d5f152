//! Pragma inspector tabs
//!
//! Three sibling tabs over one table, one per introspection pragma.
//! Each tab is self-contained: fixed headers from its `PragmaKind`,
//! rows re-fetched every time the tab is shown, padded out to the
//! header width so positional access never goes out of bounds.

use dbscope_core::{Connection, PragmaKind, Result, Row};
use dbscope_sqlite::{PageSource, Pager};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::args::PragmaArgs;

/// One pragma tab's current contents
#[derive(Debug, Clone)]
pub struct PragmaTab {
    pub kind: PragmaKind,
    pub headers: &'static [&'static str],
    pub rows: Vec<Row>,
}

/// Inspector over one table's metadata pragmas
pub struct PragmaInspector {
    conn: Arc<dyn Connection>,
    table: String,
    tabs: [PragmaTab; 3],
}

impl PragmaInspector {
    pub fn new(conn: Arc<dyn Connection>, args: &PragmaArgs) -> Result<Self> {
        args.validate()?;
        let tabs = PragmaKind::ALL.map(|kind| PragmaTab {
            kind,
            headers: kind.columns(),
            rows: Vec::new(),
        });
        Ok(Self {
            conn,
            table: args.table_name.clone(),
            tabs,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Read a tab without refreshing it.
    pub fn tab(&self, kind: PragmaKind) -> &PragmaTab {
        &self.tabs[Self::slot(kind)]
    }

    /// Make a tab visible: re-run its pragma query and replace its
    /// rows. Other tabs are untouched.
    #[tracing::instrument(skip(self, token), fields(table = %self.table))]
    pub async fn show(&mut self, kind: PragmaKind, token: &CancellationToken) -> Result<&PragmaTab> {
        let pager = Pager::new(
            Arc::clone(&self.conn),
            PageSource::Pragma(kind, self.table.clone()),
        );
        let rows = pager.stream(token.clone()).collect_rows().await;

        let width = kind.columns().len();
        let tab = &mut self.tabs[Self::slot(kind)];
        tab.rows = rows;
        for row in &mut tab.rows {
            row.pad_to(width);
        }

        tracing::debug!(kind = %kind.label(), rows = tab.rows.len(), "pragma tab refreshed");
        Ok(&self.tabs[Self::slot(kind)])
    }

    fn slot(kind: PragmaKind) -> usize {
        match kind {
            PragmaKind::TableInfo => 0,
            PragmaKind::ForeignKeys => 1,
            PragmaKind::Indexes => 2,
        }
    }
}
