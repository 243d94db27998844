use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracker_core::{NewsItem, NewsSource};

/// Steady-state pause between polling cycles.
pub const POLL_INTERVAL: Duration = Duration::from_secs(300);
/// Back-off after a failed fetch cycle.
pub const ERROR_COOLDOWN: Duration = Duration::from_secs(60);
/// Granularity at which sleeps observe the stop flag; bounds shutdown
/// latency.
pub const STOP_TICK: Duration = Duration::from_secs(1);
/// Spacing between emissions within one batch, so consumers process
/// incrementally instead of in a burst.
pub const EMIT_SPACING: Duration = Duration::from_millis(100);
/// On the first completed cycle only the most recent items are emitted, to
/// avoid flooding the feed with the whole backlog at startup.
pub const FIRST_CYCLE_CAP: usize = 3;

/// Long-lived polling loop over a news source for one watched ticker set.
///
/// Dedup state (the seen-link set) lives and dies with one poller instance:
/// a replacement poller starts fresh and may re-emit items a previous
/// instance already delivered. Changing the watch set therefore means
/// stopping this instance (awaiting actual termination) and spawning a new
/// one.
pub struct NewsPoller {
    source: Arc<dyn NewsSource>,
    tickers: Vec<String>,
}

/// Cooperative stop handle. `stop()` sets the flag and awaits loop exit;
/// latency is bounded by `STOP_TICK`.
pub struct PollerHandle {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl PollerHandle {
    /// Signal the loop without waiting for it.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Signal the loop and wait until it has actually terminated. Required
    /// before starting a replacement poller, so two instances never race on
    /// overlapping emission.
    pub async fn stop(self) {
        self.stop.store(true, Ordering::Relaxed);
        let _ = self.handle.await;
    }
}

impl NewsPoller {
    pub fn new(source: Arc<dyn NewsSource>, tickers: Vec<String>) -> Self {
        Self { source, tickers }
    }

    /// Spawn the polling loop; discovered items arrive on `tx` one at a
    /// time, oldest first within each batch.
    pub fn spawn(self, tx: mpsc::Sender<NewsItem>) -> PollerHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = tokio::spawn(async move {
            self.run(tx, flag).await;
        });

        PollerHandle { stop, handle }
    }

    async fn run(self, tx: mpsc::Sender<NewsItem>, stop: Arc<AtomicBool>) {
        let mut seen: HashSet<String> = HashSet::new();
        let mut first_cycle = true;

        tracing::info!(
            "news poller started for {} ticker(s)",
            self.tickers.len()
        );

        while !stop.load(Ordering::Relaxed) {
            match self.source.fetch_news(&self.tickers).await {
                Ok(pool) => {
                    // Pool is newest-first. Every newly observed link goes
                    // into the seen set immediately, including first-cycle
                    // items beyond the cap, so nothing is emitted twice and
                    // the startup backlog never leaks into later cycles.
                    let mut fresh: Vec<NewsItem> = Vec::new();
                    for item in pool {
                        if seen.insert(item.link.clone()) {
                            fresh.push(item);
                        }
                    }

                    let batch: Vec<NewsItem> = if first_cycle {
                        fresh.into_iter().take(FIRST_CYCLE_CAP).collect()
                    } else {
                        fresh
                    };
                    first_cycle = false;

                    if !batch.is_empty() {
                        tracing::info!("{} new news item(s)", batch.len());
                    }

                    // Oldest first, stop flag checked at every emission
                    // boundary.
                    for item in batch.into_iter().rev() {
                        if stop.load(Ordering::Relaxed) {
                            return;
                        }
                        if tx.send(item).await.is_err() {
                            // Consumer is gone; nothing left to poll for.
                            return;
                        }
                        sleep(EMIT_SPACING).await;
                    }

                    if !Self::interruptible_sleep(POLL_INTERVAL, &stop).await {
                        return;
                    }
                }
                Err(e) => {
                    // Transient by definition: log, cool down, retry. The
                    // loop only ever exits via the stop flag.
                    tracing::warn!("news fetch cycle failed: {}", e);
                    if !Self::interruptible_sleep(ERROR_COOLDOWN, &stop).await {
                        return;
                    }
                }
            }
        }
    }

    /// Sleep for `total`, waking at `STOP_TICK` granularity to observe the
    /// stop flag. Returns false when stopped.
    async fn interruptible_sleep(total: Duration, stop: &AtomicBool) -> bool {
        let mut remaining = total;
        while remaining > Duration::ZERO {
            if stop.load(Ordering::Relaxed) {
                return false;
            }
            let tick = remaining.min(STOP_TICK);
            sleep(tick).await;
            remaining -= tick;
        }
        !stop.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;
    use tracker_core::TrackerError;

    fn item(n: usize) -> NewsItem {
        NewsItem {
            source: "Test Wire".to_string(),
            ticker: "NVDA".to_string(),
            title: format!("headline {n}"),
            link: format!("https://example.com/news/{n}"),
            publisher: Some("Example".to_string()),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
                + chrono::Duration::minutes(n as i64),
            text: None,
            trading_signal: None,
        }
    }

    /// Newest-first pool for a batch of item numbers.
    fn pool(numbers: &[usize]) -> Vec<NewsItem> {
        let mut items: Vec<NewsItem> = numbers.iter().map(|&n| item(n)).collect();
        items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        items
    }

    /// Scripted source: returns one prepared response per cycle, then
    /// empty pools forever.
    struct ScriptedSource {
        cycles: Mutex<Vec<Result<Vec<NewsItem>, TrackerError>>>,
    }

    impl ScriptedSource {
        fn new(cycles: Vec<Result<Vec<NewsItem>, TrackerError>>) -> Arc<Self> {
            Arc::new(Self {
                cycles: Mutex::new(cycles),
            })
        }
    }

    #[async_trait]
    impl NewsSource for ScriptedSource {
        async fn fetch_news(&self, _tickers: &[String]) -> Result<Vec<NewsItem>, TrackerError> {
            let mut cycles = self.cycles.lock().unwrap();
            if cycles.is_empty() {
                Ok(Vec::new())
            } else {
                cycles.remove(0)
            }
        }
    }

    async fn collect(rx: &mut mpsc::Receiver<NewsItem>, n: usize) -> Vec<NewsItem> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(rx.recv().await.expect("poller emitted"));
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn first_cycle_emits_at_most_three_most_recent() {
        let source = ScriptedSource::new(vec![Ok(pool(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]))]);
        let (tx, mut rx) = mpsc::channel(32);
        let handle = NewsPoller::new(source, vec!["NVDA".to_string()]).spawn(tx);

        let emitted = collect(&mut rx, 3).await;
        // The three most recent, delivered oldest-to-newest.
        let titles: Vec<_> = emitted.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["headline 8", "headline 9", "headline 10"]);

        handle.stop().await;
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn later_cycles_emit_every_new_item_and_never_repeat() {
        // Cycle 1: items 1-5 (cap limits emission to 3, all 5 marked seen).
        // Cycle 2: items 1-5 again plus 6-15 new.
        let source = ScriptedSource::new(vec![
            Ok(pool(&[1, 2, 3, 4, 5])),
            Ok(pool(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15])),
        ]);
        let (tx, mut rx) = mpsc::channel(64);
        let handle = NewsPoller::new(source, vec!["NVDA".to_string()]).spawn(tx);

        let first = collect(&mut rx, 3).await;
        assert_eq!(
            first.iter().map(|i| i.title.as_str()).collect::<Vec<_>>(),
            vec!["headline 3", "headline 4", "headline 5"]
        );

        // All ten genuinely-new items arrive; nothing from cycle 1 repeats,
        // including the capped-out backlog items 1 and 2.
        let second = collect(&mut rx, 10).await;
        let titles: Vec<_> = second.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            (6..=15).map(|n| format!("headline {n}")).collect::<Vec<_>>()
        );

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_errors_back_off_and_recover() {
        let source = ScriptedSource::new(vec![
            Err(TrackerError::FetchFailed("upstream 500".to_string())),
            Ok(pool(&[1])),
        ]);
        let (tx, mut rx) = mpsc::channel(8);
        let handle = NewsPoller::new(source, vec!["NVDA".to_string()]).spawn(tx);

        // The error cycle is absorbed; after the cooldown the next cycle
        // still delivers.
        let emitted = collect(&mut rx, 1).await;
        assert_eq!(emitted[0].title, "headline 1");

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_terminates_promptly_during_sleep() {
        let source = ScriptedSource::new(vec![Ok(Vec::new())]);
        let (tx, mut rx) = mpsc::channel(8);
        let handle = NewsPoller::new(source, vec!["NVDA".to_string()]).spawn(tx);

        // Let the first (empty) cycle complete and the long sleep begin.
        tokio::task::yield_now().await;

        handle.stop().await;
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn closed_consumer_ends_the_loop() {
        let source = ScriptedSource::new(vec![Ok(pool(&[1, 2, 3]))]);
        let (tx, rx) = mpsc::channel(8);
        drop(rx);
        let handle = NewsPoller::new(source, vec!["NVDA".to_string()]).spawn(tx);

        // The loop notices the closed channel on first emission and exits
        // without being stopped explicitly.
        let _ = tokio::time::timeout(Duration::from_secs(600), handle.handle).await;
    }
}
