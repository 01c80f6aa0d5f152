//! SQLite access layer for dbscope
//!
//! Wraps a rusqlite connection behind the `dbscope_core::Connection`
//! trait and builds the inspector-specific pieces on top of it:
//! schema catalog queries, pragma introspection, drop/clear statement
//! helpers, and the cancellable paged-query producer.

pub mod catalog;
mod connection;
mod pager;

pub use catalog::quote_ident;
pub use connection::*;
pub use pager::*;
