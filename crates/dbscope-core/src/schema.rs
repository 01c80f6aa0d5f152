//! Schema catalog types

use serde::{Deserialize, Serialize};

/// Kind of schema object tracked by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaType {
    /// Regular table
    Table,
    /// View
    View,
    /// Trigger
    Trigger,
}

impl SchemaType {
    /// All schema types in catalog display order
    pub const ALL: [SchemaType; 3] = [SchemaType::Table, SchemaType::View, SchemaType::Trigger];

    /// The `type` value used by `sqlite_master` for this kind
    pub fn master_type(&self) -> &'static str {
        match self {
            SchemaType::Table => "table",
            SchemaType::View => "view",
            SchemaType::Trigger => "trigger",
        }
    }

    /// Display label for catalog tabs
    pub fn label(&self) -> &'static str {
        match self {
            SchemaType::Table => "Tables",
            SchemaType::View => "Views",
            SchemaType::Trigger => "Triggers",
        }
    }
}

impl std::fmt::Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.master_type())
    }
}

/// One catalog entry: a named table, view, or trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaObject {
    /// Object name as recorded in `sqlite_master`
    pub name: String,
    /// Owning schema type
    pub kind: SchemaType,
    /// The CREATE statement that defined the object, when recorded
    pub sql: Option<String>,
}

/// A discovered SQLite database file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    /// File name without directory components
    pub name: String,
    /// Absolute filesystem path
    pub path: std::path::PathBuf,
    /// File size in bytes at scan time
    pub size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn master_type_round_trip() {
        for kind in SchemaType::ALL {
            assert_eq!(kind.to_string(), kind.master_type());
        }
    }
}
