//! # Function-backed fetcher (`FetchFn`)
//!
//! [`FetchFn`] wraps a closure `F: Fn() -> Fut`, producing a fresh future per
//! fetch attempt. No shared mutable state is implied: if a closure needs
//! state across attempts (cursors, page tokens), capture an explicit
//! `Arc<...>` inside it.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use feedvisor::{Batch, FetchError, FetchFn, Fetcher, FetcherRef, Item};
//!
//! let feed: FetcherRef = FetchFn::arc("demo", || async {
//!     let items = vec![Item::new("hello", "demo", "demo-1")];
//!     Ok::<_, FetchError>(Batch::after(items, Duration::from_secs(60)))
//! });
//!
//! assert_eq!(feed.name(), "demo");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::fetch::fetcher::{Batch, Fetcher};

/// Function-backed fetcher implementation.
///
/// Wraps a closure that *creates* a new future per attempt.
#[derive(Debug)]
pub struct FetchFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> FetchFn<F> {
    /// Creates a new function-backed fetcher.
    ///
    /// Prefer [`FetchFn::arc`] when you immediately need a
    /// [`FetcherRef`](crate::FetcherRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the fetcher and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Fetcher for FetchFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Batch, FetchError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Batch, FetchError> {
        (self.f)().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::fetch::fetcher::FetcherRef;
    use crate::fetch::item::Item;

    #[tokio::test]
    async fn test_fetch_invokes_closure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let feed: FetcherRef = FetchFn::arc("counted", move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                let items = vec![Item::new("one", "counted", "c-1")];
                Ok(Batch::after(items, Duration::from_secs(1)))
            }
        });

        let batch = feed.fetch().await.expect("closure returns Ok");
        assert_eq!(batch.items.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        feed.fetch().await.expect("fresh future per call");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let feed: FetcherRef = FetchFn::arc("broken", || async {
            Err(FetchError::failed("connection refused"))
        });

        let err = feed.fetch().await.expect_err("closure returns Err");
        assert_eq!(err.to_string(), "fetch failed: connection refused");
    }
}
