//! # feedvisor
//!
//! **Feedvisor** turns polling data sources into continuous, deduplicated,
//! cancellable item streams.
//!
//! A [`Fetcher`] retrieves a batch of [`Item`]s and reports when it is worth
//! polling again. [`subscribe`] wraps one fetcher in a coordinator loop that
//! owns the schedule, runs fetches without stalling delivery, drops GUIDs it
//! has already admitted, buffers under a fixed bound and delivers in order
//! until the subscription is closed. [`merge`] fans several subscriptions
//! into one stream.
//!
//! ## Architecture
//! ```text
//!  Fetcher ──fetch()──► Coordinator loop ──items──► Subscription ──► consumer
//!                        │  schedule: next fetch instant / 10 s backoff
//!                        │  dedup:    set of admitted GUIDs
//!                        │  buffer:   pending (FIFO, max 10)
//!                        └─ close:    rendezvous, reports the last fetch error
//!
//!  merge(s1, s2, …) ──► one relay per input ──► one Subscription
//! ```
//!
//! ## Guarantees
//! | Property        | Meaning                                                                 |
//! |-----------------|-------------------------------------------------------------------------|
//! | At-most-once    | a GUID is delivered at most once per subscription lifetime              |
//! | In-order        | admission order (batch order, sequential batches) is delivery order     |
//! | Single flight   | at most one fetch call is outstanding per subscription                  |
//! | Silent failures | fetch errors only delay polling; the last one is reported by `close`    |
//! | Clean close     | when `close` returns the stream is over; an in-flight fetch is discarded|
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use feedvisor::{subscribe, Batch, FetchError, FetchFn, FetcherRef, Item};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let feed: FetcherRef = FetchFn::arc("world-news", || async {
//!         let items = vec![
//!             Item::new("headline one", "world-news", "wn-1"),
//!             Item::new("headline two", "world-news", "wn-2"),
//!         ];
//!         Ok::<_, FetchError>(Batch::after(items, Duration::from_secs(60)))
//!     });
//!
//!     let mut sub = subscribe(feed);
//!     let first = sub.recv().await.expect("stream is open");
//!     assert_eq!(first.guid, "wn-1");
//!     let second = sub.recv().await.expect("stream is open");
//!     assert_eq!(second.guid, "wn-2");
//!
//!     assert!(sub.close().await.is_ok());
//! }
//! ```
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
mod error;
mod events;
mod fetch;
mod sub;

// ---- Public re-exports ----

pub use error::FetchError;
pub use events::{Bus, Event, EventKind};
pub use fetch::{Batch, FetchFn, Fetcher, FetcherRef, Item};
pub use sub::{merge, subscribe, Closer, Subscription, Updates, MAX_PENDING, RETRY_BACKOFF};

// Optional: expose a simple built-in event printer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use events::LogWriter;
