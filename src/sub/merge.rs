//! # Merge: fan several subscriptions into one.
//!
//! [`merge`] starts one relay per input forwarding items into a shared
//! output channel, so the merged stream yields the interleaving of its
//! inputs as their deliveries occur; there is no ordering guarantee across
//! sources. Input events are republished onto the merged bus.
//!
//! ## Close protocol
//! Closing the merged handle cancels the relays, closes every input and
//! aggregates their results: the first error encountered (in input order)
//! wins, `Ok(())` when every input closes cleanly. The acknowledgement is
//! held back until all relays have stopped.

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;
use crate::events::Bus;
use crate::fetch::Item;
use crate::sub::coordinator::CloseReply;
use crate::sub::subscription::Subscription;
use crate::sub::EVENT_CAPACITY;

/// Fans several subscriptions into one.
///
/// The relays start immediately; must be called from within a Tokio runtime.
/// Merging an empty vector yields a stream that ends at once and closes
/// with `Ok(())`.
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use feedvisor::{merge, subscribe, Batch, FetchError, FetchFn, FetcherRef, Item};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let one: FetcherRef = FetchFn::arc("one", || async {
///         let items = vec![Item::new("x", "one", "x-1")];
///         Ok::<_, FetchError>(Batch::after(items, Duration::from_secs(3600)))
///     });
///     let two: FetcherRef = FetchFn::arc("two", || async {
///         let items = vec![Item::new("y", "two", "y-1")];
///         Ok::<_, FetchError>(Batch::after(items, Duration::from_secs(3600)))
///     });
///
///     let mut merged = merge(vec![subscribe(one), subscribe(two)]);
///     let mut got = vec![
///         merged.recv().await.unwrap().guid,
///         merged.recv().await.unwrap().guid,
///     ];
///     got.sort();
///     assert_eq!(got, ["x-1", "y-1"]);
///
///     assert!(merged.close().await.is_ok());
/// }
/// ```
pub fn merge(subs: Vec<Subscription>) -> Subscription {
    let bus = Bus::new(EVENT_CAPACITY);
    let (updates_tx, updates_rx) = mpsc::channel(1);
    let (closing_tx, closing_rx) = mpsc::channel(1);

    tokio::spawn(run(subs, updates_tx, closing_rx, bus.clone()));
    Subscription::from_parts(updates_rx, closing_tx, bus)
}

async fn run(
    subs: Vec<Subscription>,
    updates: mpsc::Sender<Item>,
    mut closing: mpsc::Receiver<CloseReply>,
    bus: Bus,
) {
    let quit = CancellationToken::new();
    let mut relays = JoinSet::new();
    let mut closers = Vec::with_capacity(subs.len());

    for sub in subs {
        // the event tap has to be taken before the handle is torn apart
        let mut events = sub.events();
        let (mut items, closer) = sub.split();
        closers.push(closer);

        let out = updates.clone();
        let token = quit.clone();
        relays.spawn(async move {
            loop {
                let item = tokio::select! {
                    _ = token.cancelled() => break,
                    maybe = items.recv() => match maybe {
                        Some(item) => item,
                        None => break,
                    },
                };
                tokio::select! {
                    _ = token.cancelled() => break,
                    res = out.send(item) => {
                        if res.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        let merged_bus = bus.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(ev) => merged_bus.publish(ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }
    drop(updates);

    // Wait for a close request; if every relay ends first (all inputs gone,
    // or an empty merge) fall through without one.
    let request = tokio::select! {
        maybe = closing.recv() => maybe,
        _ = async { while relays.join_next().await.is_some() {} } => None,
    };

    quit.cancel();
    let mut first_err: Option<FetchError> = None;
    for closer in closers {
        if let Err(err) = closer.close().await {
            first_err.get_or_insert(err);
        }
    }
    while relays.join_next().await.is_some() {}

    if let Some(reply) = request {
        let _ = reply.send(first_err);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time;

    use super::*;
    use crate::events::EventKind;
    use crate::fetch::{Batch, FetchFn, FetcherRef};
    use crate::sub::subscription::subscribe;

    fn one_shot_feed(name: &'static str, guid: &'static str) -> FetcherRef {
        FetchFn::arc(name, move || async move {
            let items = vec![Item::new(guid.to_uppercase(), name, guid)];
            Ok(Batch::after(items, Duration::from_secs(3600)))
        })
    }

    fn counted_feed(name: &'static str) -> (FetcherRef, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let fetcher: FetcherRef = FetchFn::arc(name, move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Batch::after(Vec::new(), Duration::from_secs(1)))
            }
        });
        (fetcher, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn test_merge_delivers_from_every_source() {
        let mut merged = merge(vec![
            subscribe(one_shot_feed("one", "x")),
            subscribe(one_shot_feed("two", "y")),
        ]);

        let mut got = vec![
            merged.recv().await.unwrap().guid,
            merged.recv().await.unwrap().guid,
        ];
        got.sort();
        assert_eq!(got, ["x", "y"]);

        assert!(merged.close().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_merge_close_stops_every_source() {
        let (one, calls_one) = counted_feed("one");
        let (two, calls_two) = counted_feed("two");
        let merged = merge(vec![subscribe(one), subscribe(two)]);

        time::sleep(Duration::from_secs(5)).await;
        assert!(calls_one.load(Ordering::SeqCst) >= 2);
        assert!(calls_two.load(Ordering::SeqCst) >= 2);

        assert!(merged.close().await.is_ok());

        // an attempt spawned just before the close may still run; let it land
        time::sleep(Duration::from_secs(30)).await;
        let settled = (
            calls_one.load(Ordering::SeqCst),
            calls_two.load(Ordering::SeqCst),
        );
        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(
            (
                calls_one.load(Ordering::SeqCst),
                calls_two.load(Ordering::SeqCst),
            ),
            settled,
            "a source kept polling after the merged handle closed"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_merge_reports_first_error() {
        let good = one_shot_feed("good", "g");
        let bad: FetcherRef = FetchFn::arc("bad", || async {
            Err(FetchError::failed("boom"))
        });

        let merged = merge(vec![subscribe(good), subscribe(bad)]);
        let mut events = merged.events();

        // wait until the failing source's error was recorded and relayed
        loop {
            let ev = events.recv().await.unwrap();
            if ev.kind == EventKind::FetchFailed {
                break;
            }
        }

        let err = merged.close().await.unwrap_err();
        assert_eq!(err.to_string(), "fetch failed: boom");
    }

    #[tokio::test(start_paused = true)]
    async fn test_merge_of_nothing_ends_immediately() {
        let mut merged = merge(Vec::new());
        assert!(merged.recv().await.is_none());
        assert!(merged.close().await.is_ok());
    }
}
