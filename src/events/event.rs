//! # Lifecycle events emitted by subscriptions.
//!
//! [`EventKind`] classifies what happened; [`Event`] carries the metadata
//! (source name, reason, backoff delay, admitted count) plus a global
//! sequence number.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Within one subscription events are published from a single
//! loop, so their `seq` order is their lifecycle order.
//!
//! ## Example
//! ```rust
//! use feedvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::FetchFailed)
//!     .with_source("world-news")
//!     .with_reason("connection refused");
//!
//! assert_eq!(ev.kind, EventKind::FetchFailed);
//! assert_eq!(ev.source.as_deref(), Some("world-news"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of subscription events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A fetch attempt was launched.
    ///
    /// Sets:
    /// - `source`: fetcher name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    FetchStarted,

    /// A fetch attempt succeeded and its batch was admitted.
    ///
    /// Sets:
    /// - `source`: fetcher name
    /// - `count`: items admitted after deduplication
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    FetchSucceeded,

    /// A fetch attempt failed.
    ///
    /// Sets:
    /// - `source`: fetcher name
    /// - `reason`: failure message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    FetchFailed,

    /// The next fetch was pushed back after a failure.
    ///
    /// Sets:
    /// - `source`: fetcher name
    /// - `delay_ms`: backoff delay (ms)
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    BackoffScheduled,

    /// The subscription closed; its delivery endpoint is gone.
    ///
    /// Sets:
    /// - `source`: fetcher name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SubscriptionClosed,
}

/// Subscription event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the source, if applicable.
    pub source: Option<Arc<str>>,
    /// Human-readable reason (fetch errors).
    pub reason: Option<Arc<str>>,
    /// Backoff delay before the next attempt in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Number of items admitted by a successful fetch.
    pub count: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            source: None,
            reason: None,
            delay_ms: None,
            count: None,
        }
    }

    /// Attaches a source name.
    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a backoff delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches the number of admitted items.
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        let n = n.min(u32::MAX as usize) as u32;
        self.count = Some(n);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::FetchStarted);
        let b = Event::new(EventKind::FetchSucceeded);
        assert!(a.seq < b.seq, "seq {} should precede {}", a.seq, b.seq);
    }

    #[test]
    fn test_builders_set_fields() {
        let ev = Event::new(EventKind::BackoffScheduled)
            .with_source("world-news")
            .with_reason("connection refused")
            .with_delay(Duration::from_secs(10))
            .with_count(3);

        assert_eq!(ev.source.as_deref(), Some("world-news"));
        assert_eq!(ev.reason.as_deref(), Some("connection refused"));
        assert_eq!(ev.delay_ms, Some(10_000));
        assert_eq!(ev.count, Some(3));
    }

    #[test]
    fn test_new_leaves_metadata_unset() {
        let ev = Event::new(EventKind::SubscriptionClosed);
        assert!(ev.source.is_none());
        assert!(ev.reason.is_none());
        assert!(ev.delay_ms.is_none());
        assert!(ev.count.is_none());
    }
}
