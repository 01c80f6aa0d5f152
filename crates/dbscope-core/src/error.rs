//! Error types for dbscope

use thiserror::Error;

/// Core error type for dbscope operations
#[derive(Error, Debug)]
pub enum DbscopeError {
    /// Missing or blank navigation arguments; screens render an inert
    /// error state instead of issuing a query.
    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Schema error: {0}")]
    Schema(String),

    /// A single unreadable import source; the batch continues past it.
    #[error("Import error: {0}")]
    Import(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

/// Result type alias for dbscope operations
pub type Result<T> = std::result::Result<T, DbscopeError>;
