//! Subscription machinery: the coordinator loop, consumer handles, and merge.
//!
//! ## Contents
//! - [`subscribe`] converts one [`Fetcher`](crate::Fetcher) into a [`Subscription`]
//! - [`merge`] fans several subscriptions into one
//! - [`Subscription`], [`Updates`], [`Closer`] the consumer-facing handles
//!
//! ## Fixed constants
//! The admission bound and the failure backoff are part of the design, not
//! configuration: [`MAX_PENDING`] and [`RETRY_BACKOFF`]. Neither
//! [`subscribe`] nor [`merge`] takes parameters beyond their inputs.

use std::time::Duration;

mod coordinator;
mod merge;
mod subscription;

/// Maximum number of admitted items awaiting delivery per subscription.
///
/// While the buffer is at capacity no new fetch is started; delivery has to
/// drain it first.
pub const MAX_PENDING: usize = 10;

/// Fixed delay before the next fetch attempt after a failure.
///
/// The schedule reported by a failing source is not trusted; this constant
/// overrides it.
pub const RETRY_BACKOFF: Duration = Duration::from_secs(10);

/// Capacity of the event bus attached to each subscription.
pub(crate) const EVENT_CAPACITY: usize = 64;

pub use merge::merge;
pub use subscription::{subscribe, Closer, Subscription, Updates};
