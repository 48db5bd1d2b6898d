//! # Subscription handles: receive items, close the stream.
//!
//! [`subscribe`] starts a coordinator loop for a fetcher and returns a
//! [`Subscription`]: the receive endpoint plus the close operation. The two
//! halves can be [`split`](Subscription::split) when reading and closing
//! happen on different tasks.
//!
//! ## Close protocol
//! Close is a synchronous rendezvous modeled as a request carrying a reply
//! channel: the coordinator answers exactly once, from inside its own loop,
//! after the delivery endpoint is already closed. When `close` returns, the
//! loop has performed its last transition and holds nothing.

use tokio::sync::{broadcast, mpsc, oneshot};

use crate::error::FetchError;
use crate::events::{Bus, Event};
use crate::fetch::{FetcherRef, Item};
use crate::sub::coordinator::{CloseReply, Coordinator};
use crate::sub::EVENT_CAPACITY;

/// Converts a fetcher into a stream of deduplicated items.
///
/// The coordinator loop starts immediately; must be called from within a
/// Tokio runtime. The loop polls the fetcher on its self-reported schedule,
/// deduplicates by GUID, buffers up to [`MAX_PENDING`](crate::MAX_PENDING)
/// items and delivers them in admission order until the subscription is
/// closed or every handle is dropped.
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use feedvisor::{subscribe, Batch, FetchError, FetchFn, FetcherRef, Item};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let feed: FetcherRef = FetchFn::arc("demo", || async {
///         let items = vec![Item::new("hello", "demo", "demo-1")];
///         Ok::<_, FetchError>(Batch::after(items, Duration::from_secs(60)))
///     });
///
///     let mut sub = subscribe(feed);
///     assert_eq!(sub.recv().await.unwrap().guid, "demo-1");
///     assert!(sub.close().await.is_ok());
/// }
/// ```
pub fn subscribe(fetcher: FetcherRef) -> Subscription {
    let bus = Bus::new(EVENT_CAPACITY);
    let (updates_tx, updates_rx) = mpsc::channel(1);
    let (closing_tx, closing_rx) = mpsc::channel(1);

    Coordinator::new(fetcher, updates_tx, closing_rx, bus.clone()).spawn();
    Subscription::from_parts(updates_rx, closing_tx, bus)
}

/// A stream of deduplicated items plus the operation to end it.
pub struct Subscription {
    updates: Updates,
    closer: Closer,
    bus: Bus,
}

impl Subscription {
    pub(crate) fn from_parts(
        updates: mpsc::Receiver<Item>,
        closing: mpsc::Sender<CloseReply>,
        bus: Bus,
    ) -> Self {
        Self {
            updates: Updates { rx: updates },
            closer: Closer { closing },
            bus,
        }
    }

    /// Receives the next item.
    ///
    /// Returns `None` once the subscription has closed and every delivered
    /// item was drained (the natural end-of-stream signal).
    pub async fn recv(&mut self) -> Option<Item> {
        self.updates.recv().await
    }

    /// Returns a fresh receiver of lifecycle [`Event`]s.
    ///
    /// Each call creates an independent tap observing events published after
    /// it was created. Dropping receivers never affects the subscription.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Ends the subscription and reports the last fetch error, if any.
    ///
    /// Blocks until the coordinator acknowledges. The delivery endpoint is
    /// closed before the acknowledgement, so after `close` returns the
    /// stream is over. Returns `Ok(())` when no fetch failed since the last
    /// success; closing a subscription whose loop is already gone is a
    /// no-op `Ok(())`.
    pub async fn close(self) -> Result<(), FetchError> {
        let Subscription {
            updates, closer, ..
        } = self;
        let res = closer.close().await;
        drop(updates);
        res
    }

    /// Splits the subscription into its receive and close halves.
    ///
    /// Useful when items are consumed on one task and the close decision is
    /// made on another (timers, merge relays). After a close issued through
    /// the [`Closer`], at most one item already handed to the delivery
    /// channel may still be yielded before `None`.
    pub fn split(self) -> (Updates, Closer) {
        (self.updates, self.closer)
    }
}

/// Receive half of a subscription.
pub struct Updates {
    rx: mpsc::Receiver<Item>,
}

impl Updates {
    /// Receives the next item; `None` once the stream is closed and drained.
    pub async fn recv(&mut self) -> Option<Item> {
        self.rx.recv().await
    }
}

/// Close half of a subscription.
///
/// Cloneable so several tasks may hold the right to close. The coordinator
/// answers the first request; every later close observes `Ok(())`.
#[derive(Clone)]
pub struct Closer {
    closing: mpsc::Sender<CloseReply>,
}

impl Closer {
    /// Requests close and awaits the coordinator's acknowledgement.
    pub async fn close(&self) -> Result<(), FetchError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.closing.send(reply_tx).await.is_err() {
            // the loop already terminated
            return Ok(());
        }
        match reply_rx.await {
            Ok(Some(err)) => Err(err),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time;

    use super::*;
    use crate::fetch::{Batch, FetchFn};

    fn quiet_feed() -> FetcherRef {
        FetchFn::arc("quiet-feed", || async {
            Ok(Batch::after(Vec::new(), Duration::from_secs(1)))
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_split_timer_close() {
        let (mut updates, closer) = subscribe(quiet_feed()).split();

        tokio::spawn({
            let closer = closer.clone();
            async move {
                time::sleep(Duration::from_secs(3)).await;
                assert!(closer.close().await.is_ok());
            }
        });

        assert!(
            updates.recv().await.is_none(),
            "stream should end after the timer close"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_close_is_noop() {
        let (updates, closer) = subscribe(quiet_feed()).split();
        let other = closer.clone();

        assert!(closer.close().await.is_ok());
        assert!(other.close().await.is_ok(), "repeat close should be silent");
        drop(updates);
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_tap_survives_handle_moves() {
        let sub = subscribe(quiet_feed());
        let mut events = sub.events();

        let (updates, closer) = sub.split();
        assert!(closer.close().await.is_ok());
        drop(updates);

        // the tap stays valid after split/close; the closed marker arrives
        loop {
            match events.recv().await {
                Ok(ev) if ev.kind == crate::events::EventKind::SubscriptionClosed => break,
                Ok(_) => continue,
                Err(err) => panic!("event stream ended early: {err}"),
            }
        }
    }
}
