//! # Event bus for broadcasting subscription events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. The
//! coordinator publishes without blocking; any number of observers can tap
//! the stream with [`Bus::subscribe`].
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks or fails; with no
//!   active receivers the event is simply dropped.
//! - **Bounded capacity**: a single ring buffer stores recent events for all
//!   receivers; slow receivers observe `RecvError::Lagged(n)` and skip the
//!   `n` oldest events.
//! - **No persistence**: a receiver only observes events published after it
//!   subscribed.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for subscription events.
///
/// Cheap to clone (internally holds an `Arc`-backed sender); each
/// subscription carries one and its handles hand out receivers.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity.
    ///
    /// The minimum capacity is 1 (clamped).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// Takes ownership of the event; the channel clones it per receiver.
    /// With no receivers the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    ///
    /// Each call creates an independent receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::broadcast::error::TryRecvError;

    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn test_publish_reaches_receiver() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();

        bus.publish(Event::new(EventKind::FetchStarted).with_source("world-news"));

        let ev = rx.recv().await.expect("bus is open");
        assert_eq!(ev.kind, EventKind::FetchStarted);
        assert_eq!(ev.source.as_deref(), Some("world-news"));
    }

    #[tokio::test]
    async fn test_late_receiver_misses_earlier_events() {
        let bus = Bus::new(8);
        bus.publish(Event::new(EventKind::FetchStarted));

        let mut rx = bus.subscribe();
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_publish_without_receivers_is_silent() {
        let bus = Bus::new(1);
        // no receiver exists; nothing to assert beyond "does not panic"
        bus.publish(Event::new(EventKind::SubscriptionClosed));
    }
}
