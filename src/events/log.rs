//! # LogWriter — simple event printer
//!
//! A minimal listener that prints subscription [`Event`]s to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [fetch-started] source="world-news"
//! [fetched] source="world-news" admitted=3
//! [fetch-failed] source="world-news" err="fetch failed: connection refused"
//! [backoff] source="world-news" delay_ms=10000
//! [closed] source="world-news"
//! ```

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::events::{Event, EventKind};

/// Event printer.
pub struct LogWriter;

impl LogWriter {
    /// Drains the receiver on its own task, printing every event until the
    /// bus closes.
    pub fn spawn(mut events: broadcast::Receiver<Event>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(ev) => Self::write(&ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    fn write(e: &Event) {
        let source = e.source.as_deref().unwrap_or("unknown");
        match e.kind {
            EventKind::FetchStarted => {
                println!("[fetch-started] source={source:?}");
            }
            EventKind::FetchSucceeded => {
                println!(
                    "[fetched] source={source:?} admitted={}",
                    e.count.unwrap_or(0)
                );
            }
            EventKind::FetchFailed => {
                println!(
                    "[fetch-failed] source={source:?} err={:?}",
                    e.reason.as_deref().unwrap_or("unknown")
                );
            }
            EventKind::BackoffScheduled => {
                println!(
                    "[backoff] source={source:?} delay_ms={}",
                    e.delay_ms.unwrap_or(0)
                );
            }
            EventKind::SubscriptionClosed => {
                println!("[closed] source={source:?}");
            }
        }
    }
}
