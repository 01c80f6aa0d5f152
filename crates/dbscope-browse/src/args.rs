//! Navigation argument contracts
//!
//! Every screen-equivalent entry point takes a typed argument struct
//! and rejects blank required fields up front, so a session never gets
//! far enough to issue a query with a missing name.

use dbscope_core::{DbscopeError, Result, SchemaType};
use std::path::PathBuf;

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DbscopeError::Navigation(format!(
            "required argument '{field}' is blank"
        )));
    }
    Ok(())
}

/// Entry into a schema catalog listing
#[derive(Debug, Clone)]
pub struct CatalogArgs {
    pub database_name: String,
    pub database_path: PathBuf,
}

impl CatalogArgs {
    pub fn validate(&self) -> Result<()> {
        require("database_name", &self.database_name)?;
        require("database_path", &self.database_path.to_string_lossy())
    }
}

/// Entry into a content viewer session
#[derive(Debug, Clone)]
pub struct ContentArgs {
    pub database_name: String,
    pub database_path: PathBuf,
    pub schema_name: String,
    pub kind: SchemaType,
}

impl ContentArgs {
    pub fn validate(&self) -> Result<()> {
        require("database_name", &self.database_name)?;
        require("database_path", &self.database_path.to_string_lossy())?;
        require("schema_name", &self.schema_name)
    }
}

/// Entry into the pragma inspector
#[derive(Debug, Clone)]
pub struct PragmaArgs {
    pub database_path: PathBuf,
    pub table_name: String,
}

impl PragmaArgs {
    pub fn validate(&self) -> Result<()> {
        require("database_path", &self.database_path.to_string_lossy())?;
        require("table_name", &self.table_name)
    }
}
