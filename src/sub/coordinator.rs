//! # Coordinator: the per-subscription event loop.
//!
//! One coordinator task owns all subscription state. Fetch attempts run on
//! their own short-lived tasks and hand their outcome back over a single-slot
//! channel, so scheduling, delivery and close stay responsive while a fetch
//! is slow.
//!
//! ## Architecture
//! ```text
//! subscribe(fetcher) ──► Coordinator::spawn()
//!
//! loop {
//!   select! over four armed/disabled branches:
//!     ├─► start fetch   armed: !in_flight && pending.len() < MAX_PENDING
//!     │     fires once `next` is reached; spawns the fetch task and
//!     │     returns to the select without awaiting it
//!     ├─► fetch done    armed: in_flight
//!     │     Ok(batch) → adopt batch.next, admit GUID-fresh items in order
//!     │     Err(err)  → next = now + RETRY_BACKOFF, remember err
//!     ├─► deliver       armed: pending non-empty (and consumer alive)
//!     │     moves the head of `pending` into the updates channel
//!     └─► close         always armed; exclusive and terminal
//! }
//! close: endpoint drops (stream ends) → reply(last_err) → loop is gone
//! ```
//!
//! ## Rules
//! - All state lives in the loop. The fetch task computes an outcome and
//!   hands it off; it never touches coordinator state, so no lock exists.
//! - At most one fetch is in flight per subscription at any instant.
//! - Items are delivered in admission order; admission follows batch order,
//!   and batches are strictly sequential.
//! - A fetch error is never fatal: it delays the next attempt by
//!   [`RETRY_BACKOFF`] and is remembered only for the closer. A later
//!   success clears it.
//! - Readiness among the first three branches is unordered; close wins
//!   eventually because it is always armed, and once chosen nothing else
//!   fires again.
//! - An outcome arriving after close finds the handoff receiver gone; the
//!   send fails immediately and the orphaned fetch task exits.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant};

use crate::error::FetchError;
use crate::events::{Bus, Event, EventKind};
use crate::fetch::{Batch, FetcherRef, Item};
use crate::sub::{MAX_PENDING, RETRY_BACKOFF};

/// Reply channel carried by a close request.
pub(crate) type CloseReply = oneshot::Sender<Option<FetchError>>;

/// Outcome of one fetch attempt, handed back by the fetch task.
type FetchOutcome = Result<Batch, FetchError>;

/// Per-subscription state machine. See the module docs for the loop shape.
pub(crate) struct Coordinator {
    fetcher: FetcherRef,
    updates: mpsc::Sender<Item>,
    closing: mpsc::Receiver<CloseReply>,
    bus: Bus,
}

impl Coordinator {
    pub(crate) fn new(
        fetcher: FetcherRef,
        updates: mpsc::Sender<Item>,
        closing: mpsc::Receiver<CloseReply>,
        bus: Bus,
    ) -> Self {
        Self {
            fetcher,
            updates,
            closing,
            bus,
        }
    }

    /// Starts the loop on its own task.
    pub(crate) fn spawn(self) {
        tokio::spawn(self.run());
    }

    async fn run(self) {
        let Coordinator {
            fetcher,
            updates,
            mut closing,
            bus,
        } = self;

        // Single-slot handoff. One fetch in flight means the slot is never
        // contended; once the loop is gone a send fails instead of blocking,
        // so an abandoned fetch task always exits.
        let (done_tx, mut done_rx) = mpsc::channel::<FetchOutcome>(1);

        let mut next = Instant::now();
        let mut in_flight = false;
        let mut pending: VecDeque<Item> = VecDeque::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut last_err: Option<FetchError> = None;
        let mut consumer_gone = false;

        let request = loop {
            tokio::select! {
                _ = time::sleep_until(next), if !in_flight && pending.len() < MAX_PENDING => {
                    in_flight = true;
                    bus.publish(Event::new(EventKind::FetchStarted).with_source(fetcher.name()));

                    let fetcher = Arc::clone(&fetcher);
                    let done = done_tx.clone();
                    tokio::spawn(async move {
                        let outcome = fetcher.fetch().await;
                        let _ = done.send(outcome).await;
                    });
                }

                Some(outcome) = done_rx.recv(), if in_flight => {
                    in_flight = false;
                    match outcome {
                        Ok(batch) => {
                            next = batch.next;
                            last_err = None;

                            let mut admitted = 0usize;
                            for item in batch.items {
                                // first occurrence of a GUID wins, batch order preserved
                                if seen.insert(item.guid.clone()) {
                                    pending.push_back(item);
                                    admitted += 1;
                                }
                            }
                            bus.publish(
                                Event::new(EventKind::FetchSucceeded)
                                    .with_source(fetcher.name())
                                    .with_count(admitted),
                            );
                        }
                        Err(err) => {
                            next = Instant::now() + RETRY_BACKOFF;
                            bus.publish(
                                Event::new(EventKind::FetchFailed)
                                    .with_source(fetcher.name())
                                    .with_reason(err.to_string()),
                            );
                            bus.publish(
                                Event::new(EventKind::BackoffScheduled)
                                    .with_source(fetcher.name())
                                    .with_delay(RETRY_BACKOFF),
                            );
                            last_err = Some(err);
                        }
                    }
                }

                res = updates.reserve(), if !consumer_gone && !pending.is_empty() => {
                    match res {
                        Ok(permit) => {
                            if let Some(item) = pending.pop_front() {
                                permit.send(item);
                            }
                        }
                        // The receive half was dropped. Nothing can be
                        // delivered anymore, but the loop stays up so a
                        // closer can still rendezvous.
                        Err(_) => consumer_gone = true,
                    }
                }

                // Some(reply): close requested. None: every handle was
                // dropped, nobody can ever close or read again.
                request = closing.recv() => break request,
            }
        };

        bus.publish(Event::new(EventKind::SubscriptionClosed).with_source(fetcher.name()));

        // The endpoint must be closed before the closer is released.
        drop(updates);
        if let Some(reply) = request {
            let _ = reply.send(last_err);
        }
    }
}
