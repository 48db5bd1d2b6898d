//! Subscription lifecycle events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** each
//! subscription publishes to. Events are observability only: the item stream
//! and the close contract do not depend on anyone watching the bus, and a
//! fetch failure stays invisible on the item path until `close` reports it.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//! - `LogWriter` (feature `logging`) minimal stdout printer

mod bus;
mod event;

#[cfg(feature = "logging")]
mod log;

pub use bus::Bus;
pub use event::{Event, EventKind};

#[cfg(feature = "logging")]
pub use log::LogWriter;
