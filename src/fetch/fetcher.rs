//! # Fetcher abstraction and batch result type.
//!
//! [`Fetcher`] is the retrieval seam of the crate: one async operation that
//! produces a [`Batch`] of items together with the earliest instant the next
//! poll is welcome. Everything transport-specific (HTTP, parsing, the
//! transport's own retries) lives behind this trait; the coordinator only
//! decides *when* to call it and what to do with the result.
//!
//! A fetcher is invoked repeatedly, each attempt from a fresh task. Within
//! one subscription attempts never overlap; across subscriptions the same
//! fetcher type may run concurrently with itself.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::FetchError;
use crate::fetch::item::Item;

/// Result of a successful fetch: a batch of items plus the poll schedule.
#[derive(Clone, Debug)]
pub struct Batch {
    /// Items in source order. May be empty.
    pub items: Vec<Item>,
    /// Earliest instant the next fetch should be attempted.
    pub next: Instant,
}

impl Batch {
    /// Creates a batch with an explicit next-fetch instant.
    pub fn new(items: Vec<Item>, next: Instant) -> Self {
        Self { items, next }
    }

    /// Creates a batch scheduling the next fetch `delay` from now.
    ///
    /// Convenient for TTL-style sources that report "poll again in N
    /// seconds" rather than an absolute instant.
    pub fn after(items: Vec<Item>, delay: Duration) -> Self {
        Self::new(items, Instant::now() + delay)
    }
}

/// # One-shot batch retrieval.
///
/// A `Fetcher` has a stable [`name`](Fetcher::name) (the source label, used
/// for event metadata) and an async [`fetch`](Fetcher::fetch) producing the
/// next [`Batch`]. On failure the reported schedule is ignored: the
/// subscription applies its own fixed backoff before trying again.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use std::time::Duration;
/// use feedvisor::{Batch, FetchError, Fetcher, Item};
///
/// struct Demo;
///
/// #[async_trait]
/// impl Fetcher for Demo {
///     fn name(&self) -> &str { "demo" }
///
///     async fn fetch(&self) -> Result<Batch, FetchError> {
///         let items = vec![Item::new("hello", "demo", "demo-1")];
///         Ok(Batch::after(items, Duration::from_secs(60)))
///     }
/// }
/// ```
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    /// Returns a stable, human-readable source name.
    fn name(&self) -> &str;

    /// Retrieves the next batch of items.
    ///
    /// Must be cheap to call repeatedly. Each attempt runs on its own task;
    /// within one subscription attempts are strictly sequential.
    async fn fetch(&self) -> Result<Batch, FetchError>;
}

/// Shared fetcher handle.
pub type FetcherRef = Arc<dyn Fetcher>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_after_schedules_relative_to_now() {
        let batch = Batch::after(Vec::new(), Duration::from_secs(5));
        assert_eq!(batch.next, Instant::now() + Duration::from_secs(5));
        assert!(batch.items.is_empty());
    }
}
