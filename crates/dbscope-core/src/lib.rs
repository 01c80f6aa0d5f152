//! DBSCOPE Core - shared types for the SQLite inspection toolkit
//!
//! This crate provides the fundamental types that all other dbscope
//! crates depend on:
//!
//! - `DbscopeError` / `Result` - common error handling
//! - `Connection` - trait for database connections
//! - `Value`, `Row`, `QueryResult` - query output
//! - `SchemaType`, `SchemaObject` - catalog entries
//! - `PragmaKind` - pragma introspection routing and fixed headers
//! - `Event` - cross-screen invalidation notifications

mod connection;
mod error;
mod event;
mod pragma;
mod schema;
mod types;

pub use connection::*;
pub use error::*;
pub use event::*;
pub use pragma::*;
pub use schema::*;
pub use types::*;
