//! Refresh event fan-out
//!
//! An `EventBus` is an ordinary value handed to whoever needs it, not
//! process-global state. Cloning it is cheap and every clone publishes
//! into the same channel. Subscribers only see events published after
//! they subscribed.

use dbscope_core::Event;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

/// Fan-out channel for refresh events
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish to all current subscribers. Publishing with nobody
    /// listening is fine, the event just evaporates.
    pub fn publish(&self, event: Event) {
        let delivered = self.tx.send(event).unwrap_or(0);
        tracing::debug!(?event, delivered, "event published");
    }

    pub fn subscribe(&self) -> EventSubscription {
        EventSubscription {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// One subscriber's view of the bus
pub struct EventSubscription {
    rx: broadcast::Receiver<Event>,
}

impl EventSubscription {
    /// Wait for the next event. `None` when every publisher is gone.
    ///
    /// A slow subscriber that falls behind the channel capacity skips
    /// the missed events and keeps going; refresh events are
    /// idempotent, so losing duplicates is harmless.
    pub async fn recv(&mut self) -> Option<Event> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "subscriber lagged, skipping missed events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking poll for a pending event.
    pub fn try_recv(&mut self) -> Option<Event> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}
