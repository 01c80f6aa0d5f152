//! Pragma introspection routing
//!
//! Each `PragmaKind` maps to one SQLite introspection pragma and a
//! fixed, positionally-ordered header set. The header order must
//! exactly match the pragma's native column order because consumers
//! index rows by position, not name.

use serde::{Deserialize, Serialize};

/// One tab of the pragma inspector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PragmaKind {
    /// `PRAGMA table_info` - column definitions
    TableInfo,
    /// `PRAGMA foreign_key_list` - outgoing foreign keys
    ForeignKeys,
    /// `PRAGMA index_list` - indexes on the table
    Indexes,
}

impl PragmaKind {
    /// All pragma kinds in tab display order
    pub const ALL: [PragmaKind; 3] = [
        PragmaKind::TableInfo,
        PragmaKind::ForeignKeys,
        PragmaKind::Indexes,
    ];

    /// Display label for the tab
    pub fn label(&self) -> &'static str {
        match self {
            PragmaKind::TableInfo => "Table info",
            PragmaKind::ForeignKeys => "Foreign keys",
            PragmaKind::Indexes => "Indexes",
        }
    }

    /// Fixed grid headers, in the pragma's documented column order
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            PragmaKind::TableInfo => &["cid", "name", "type", "notnull", "dflt_value", "pk"],
            PragmaKind::ForeignKeys => &[
                "id",
                "seq",
                "table",
                "from",
                "to",
                "on_update",
                "on_delete",
                "match",
            ],
            PragmaKind::Indexes => &["seq", "name", "unique", "origin", "partial"],
        }
    }

    /// Build the pragma statement for `table`
    pub fn statement(&self, table: &str) -> String {
        let escaped = table.replace('\'', "''");
        match self {
            PragmaKind::TableInfo => format!("PRAGMA table_info('{}')", escaped),
            PragmaKind::ForeignKeys => format!("PRAGMA foreign_key_list('{}')", escaped),
            PragmaKind::Indexes => format!("PRAGMA index_list('{}')", escaped),
        }
    }
}
