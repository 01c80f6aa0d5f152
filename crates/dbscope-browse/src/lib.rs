//! Browsing sessions over an open database
//!
//! The pieces a frontend composes: typed navigation arguments with
//! blank-rejection, the content viewer session state machine, and the
//! three-tab pragma inspector.

pub mod args;
pub mod content;
pub mod pragma;

pub use args::{CatalogArgs, ContentArgs, PragmaArgs};
pub use content::{ContentSession, DropOutcome, SessionState};
pub use pragma::{PragmaInspector, PragmaTab};
