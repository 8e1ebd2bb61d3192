// Scroll trigger: turns viewport-intersection signals into page requests
//
// Runs as one event loop. Signals inside the debounce window are dropped;
// accepted signals become `load_next` calls, which the coordinator itself
// ignores while a page is in flight or after the search is exhausted.

use crate::coordinator::{FetchCoordinator, IgnoreReason, Outcome};
use crate::error::FetchError;
use crate::source::ListingSource;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, warn};

// The sentinel element at the bottom of the grid became visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intersection;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TriggerReport {
    pub signals: usize,
    pub debounced: usize,
    pub loaded: usize,
    pub ignored: usize,
    pub discarded: usize,
    pub failed: usize,
}

impl TriggerReport {
    fn record(&mut self, result: Result<Outcome, FetchError>) {
        match result {
            Ok(Outcome::Loaded { .. }) => self.loaded += 1,
            Ok(Outcome::Ignored(reason)) => {
                if reason == IgnoreReason::Exhausted {
                    debug!("scroll signal after last page");
                }
                self.ignored += 1;
            }
            Ok(Outcome::Discarded) => self.discarded += 1,
            Err(err) => {
                warn!(error = %err, "page load from scroll signal failed");
                self.failed += 1;
            }
        }
    }
}

pub struct ScrollTrigger<S: ListingSource> {
    coordinator: Arc<FetchCoordinator<S>>,
    debounce: Duration,
}

// Sender side held by the interface layer. Dropping the whole handle counts
// as shutdown.
pub struct TriggerHandle {
    pub signals: mpsc::Sender<Intersection>,
    pub shutdown: oneshot::Sender<()>,
}

impl<S: ListingSource> ScrollTrigger<S> {
    pub fn new(coordinator: Arc<FetchCoordinator<S>>, debounce: Duration) -> Self {
        Self {
            coordinator,
            debounce,
        }
    }

    // Spawn the loop on the current runtime
    pub fn spawn(self) -> (TriggerHandle, tokio::task::JoinHandle<TriggerReport>) {
        let (signal_tx, signal_rx) = mpsc::channel(16);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(signal_rx, shutdown_rx));
        (
            TriggerHandle {
                signals: signal_tx,
                shutdown: shutdown_tx,
            },
            task,
        )
    }

    // Process signals until the channel closes or shutdown fires.
    //
    // Closing the channel lets in-flight loads settle. Shutdown tears the
    // coordinator down and drops whatever is still in flight.
    pub async fn run(
        self,
        mut signals: mpsc::Receiver<Intersection>,
        mut shutdown: oneshot::Receiver<()>,
    ) -> TriggerReport {
        let mut report = TriggerReport::default();
        let mut in_flight = FuturesUnordered::new();
        let mut last_accepted: Option<Instant> = None;

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!(pending = in_flight.len(), "scroll trigger shutting down");
                    self.coordinator.shutdown();
                    return report;
                }

                Some(result) = in_flight.next(), if !in_flight.is_empty() => {
                    report.record(result);
                }

                signal = signals.recv() => {
                    let Some(Intersection) = signal else {
                        break;
                    };
                    report.signals += 1;

                    let now = Instant::now();
                    if let Some(last) = last_accepted {
                        if now.duration_since(last) < self.debounce {
                            report.debounced += 1;
                            continue;
                        }
                    }
                    last_accepted = Some(now);

                    let coordinator = Arc::clone(&self.coordinator);
                    in_flight.push(async move { coordinator.load_next().await });
                }
            }
        }

        while let Some(result) = in_flight.next().await {
            report.record(result);
        }
        debug!(?report, "scroll trigger finished");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::SearchInput;
    use crate::mock_source::{stays, MockListingSource};

    async fn loaded_coordinator(
        source: &Arc<MockListingSource>,
    ) -> Arc<FetchCoordinator<MockListingSource>> {
        source.add_page(None, None, 1, stays(0..20)).await;
        source.add_page(None, None, 2, stays(20..40)).await;
        let coordinator = Arc::new(FetchCoordinator::new(Arc::clone(source)));
        coordinator.search(&SearchInput::default()).await.unwrap();
        coordinator
    }

    // With paused time the clock only advances once every task is idle
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_inside_debounce_window_fetches_once() {
        let source = Arc::new(MockListingSource::new());
        let coordinator = loaded_coordinator(&source).await;
        let (handle, task) =
            ScrollTrigger::new(Arc::clone(&coordinator), Duration::from_millis(200)).spawn();

        for _ in 0..3 {
            handle.signals.send(Intersection).await.unwrap();
        }
        drop(handle.signals);

        let report = task.await.unwrap();
        assert_eq!(report.signals, 3);
        assert_eq!(report.debounced, 2);
        assert_eq!(report.loaded, 1);
        assert_eq!(source.request_count(), 2);
        assert_eq!(coordinator.snapshot().results.len(), 40);
    }

    #[tokio::test(start_paused = true)]
    async fn test_signal_while_loading_is_ignored() {
        let source = Arc::new(MockListingSource::new());
        let coordinator = loaded_coordinator(&source).await;
        let (handle, task) = ScrollTrigger::new(Arc::clone(&coordinator), Duration::ZERO).spawn();

        let release = source.hold_next().await;
        handle.signals.send(Intersection).await.unwrap();
        settle().await;
        assert!(coordinator.snapshot().is_loading());

        handle.signals.send(Intersection).await.unwrap();
        settle().await;
        assert_eq!(source.request_count(), 2);

        release.send(()).unwrap();
        drop(handle.signals);
        let report = task.await.unwrap();
        assert_eq!(report.loaded, 1);
        assert_eq!(report.ignored, 1);
        assert_eq!(coordinator.snapshot().paging.current_page, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_fetch_after_exhaustion() {
        let source = Arc::new(MockListingSource::new());
        let coordinator = loaded_coordinator(&source).await;
        let (handle, task) = ScrollTrigger::new(Arc::clone(&coordinator), Duration::ZERO).spawn();

        // page 2 has records, page 3 is empty
        for _ in 0..3 {
            handle.signals.send(Intersection).await.unwrap();
            settle().await;
        }
        assert!(coordinator.snapshot().is_exhausted());
        let requests = source.request_count();

        handle.signals.send(Intersection).await.unwrap();
        settle().await;
        assert_eq!(source.request_count(), requests);

        drop(handle.signals);
        let report = task.await.unwrap();
        assert_eq!(report.loaded, 2);
        assert_eq!(report.ignored, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drops_in_flight_load() {
        let source = Arc::new(MockListingSource::new());
        let coordinator = loaded_coordinator(&source).await;
        let (handle, task) = ScrollTrigger::new(Arc::clone(&coordinator), Duration::ZERO).spawn();

        let release = source.hold_next().await;
        handle.signals.send(Intersection).await.unwrap();
        settle().await;

        handle.shutdown.send(()).unwrap();
        let report = task.await.unwrap();
        assert_eq!(report.loaded, 0);
        assert!(coordinator.is_shut_down());
        // the cancelled request dropped its gate
        assert!(release.send(()).is_err());
        assert_eq!(coordinator.snapshot().results.len(), 20);
    }
}
