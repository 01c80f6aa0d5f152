//! Cross-screen invalidation notifications

use serde::{Deserialize, Serialize};

/// A notification published after a destructive action so sibling
/// screens can refresh stale listings. Delivered once to current
/// subscribers; never persisted or replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    /// A trigger was dropped; trigger catalogs should re-query
    RefreshTriggers,
    /// A view was dropped; view catalogs should re-query
    RefreshViews,
    /// The discovery directory changed; database lists should re-scan
    RefreshDatabases,
}
