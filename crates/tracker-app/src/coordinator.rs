use std::sync::Arc;
use std::time::Duration;

use news_feed::{analyze_item, NewsPoller, PollerHandle};
use settings_store::{SettingsSnapshot, SettingsStore};
use signal_oracle::OracleLoader;
use technical_analysis::{indicator_panel, PanelAxis};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracker_core::{
    clean, ArticleFetcher, MarketDataProvider, NewsSource, Timeframe, TrackerError,
};
use yahoo_client::SessionPolicy;

use crate::events::AppEvent;
use crate::view::TrackerView;

/// Keystroke settling time before a search actually fires.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Axis the RSI reference lines are bound to in the indicator panel.
const RSI_AXIS: PanelAxis = PanelAxis(1);

/// The network-facing collaborators, captured as trait objects so the
/// coordinator stays free of HTTP concerns. Replaced wholesale when the
/// session policy changes.
#[derive(Clone)]
pub struct Collaborators {
    pub market: Arc<dyn MarketDataProvider>,
    pub news: Arc<dyn NewsSource>,
    pub articles: Arc<dyn ArticleFetcher>,
}

/// Builds a fresh collaborator set for a new session policy.
pub type SessionFactory =
    Box<dyn Fn(SessionPolicy) -> Result<Collaborators, TrackerError> + Send>;

/// Single consumer of the app event channel. Every background task reports
/// through an `AppEvent`; the coordinator applies results to the view one at
/// a time and never performs network I/O itself.
pub struct Coordinator<V: TrackerView> {
    view: V,
    collaborators: Collaborators,
    rebuild_session: SessionFactory,
    loader: Arc<OracleLoader>,
    store: SettingsStore,
    settings: SettingsSnapshot,
    tx: mpsc::Sender<AppEvent>,
    // Monotonic request tags; completions carrying an older tag are stale
    // and dropped without touching the view.
    search_generation: u64,
    fetch_generation: u64,
    debounce: Option<JoinHandle<()>>,
    poller: Option<PollerHandle>,
    news_forwarder: Option<JoinHandle<()>>,
}

impl<V: TrackerView> Coordinator<V> {
    pub fn new(
        mut view: V,
        collaborators: Collaborators,
        rebuild_session: SessionFactory,
        loader: Arc<OracleLoader>,
        store: SettingsStore,
        tx: mpsc::Sender<AppEvent>,
    ) -> Self {
        let settings = store.load();
        view.set_insecure_warning(!settings.ssl_verify);

        Self {
            view,
            collaborators,
            rebuild_session,
            loader,
            store,
            settings,
            tx,
            search_generation: 0,
            fetch_generation: 0,
            debounce: None,
            poller: None,
            news_forwarder: None,
        }
    }

    pub fn settings(&self) -> &SettingsSnapshot {
        &self.settings
    }

    /// Register a keystroke. The search fires only after the debounce window
    /// passes without another call; each call cancels the pending one.
    pub fn queue_search(&mut self, query: String) {
        if let Some(pending) = self.debounce.take() {
            pending.abort();
        }

        let tx = self.tx.clone();
        self.debounce = Some(tokio::spawn(async move {
            sleep(SEARCH_DEBOUNCE).await;
            let _ = tx.send(AppEvent::SearchRequested(query)).await;
        }));
    }

    fn begin_search(&mut self, query: String) {
        self.search_generation = self.search_generation.wrapping_add(1);
        let generation = self.search_generation;
        self.view.set_busy(true);

        let market = Arc::clone(&self.collaborators.market);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = market.search_symbols(&query).await;
            let _ = tx.send(AppEvent::SearchCompleted { generation, result }).await;
        });
    }

    /// Start a chart load: fetch raw history, normalize it, report the clean
    /// series (or the typed failure) back through the event channel.
    pub fn request_fetch(&mut self, symbol: String, timeframe: Timeframe) {
        self.fetch_generation = self.fetch_generation.wrapping_add(1);
        let generation = self.fetch_generation;
        self.view.set_busy(true);

        let market = Arc::clone(&self.collaborators.market);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = match market.fetch_history(&symbol, timeframe).await {
                Ok(raw) => clean(&symbol, timeframe, &raw),
                Err(e) => Err(e),
            };
            let _ = tx
                .send(AppEvent::FetchCompleted {
                    generation,
                    symbol,
                    result,
                })
                .await;
        });
    }

    /// (Re)start the news poller for the current ticker set. Awaits actual
    /// termination of the previous instance first, so two pollers never emit
    /// concurrently.
    pub async fn start_news_poller(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop().await;
        }
        if let Some(forwarder) = self.news_forwarder.take() {
            // The poller has exited and dropped its sender; the forwarder
            // drains whatever is left and ends.
            let _ = forwarder.await;
        }

        let (items_tx, mut items_rx) = mpsc::channel(32);
        let tx = self.tx.clone();
        self.news_forwarder = Some(tokio::spawn(async move {
            while let Some(item) = items_rx.recv().await {
                if tx.send(AppEvent::NewsDiscovered(item)).await.is_err() {
                    break;
                }
            }
        }));

        let poller = NewsPoller::new(
            Arc::clone(&self.collaborators.news),
            self.settings.news_tickers.clone(),
        );
        self.poller = Some(poller.spawn(items_tx));
    }

    /// Persist a new settings snapshot and apply its side effects: a changed
    /// trust policy rebuilds the session collaborators, a changed watch set
    /// restarts the news poller.
    pub async fn apply_settings(&mut self, snapshot: SettingsSnapshot) {
        if let Err(e) = self.store.save(&snapshot) {
            tracing::warn!("failed to persist settings: {e:#}");
        }

        let trust_changed = snapshot.ssl_verify != self.settings.ssl_verify;
        let tickers_changed = snapshot.news_tickers != self.settings.news_tickers;
        self.settings = snapshot;

        if trust_changed {
            let policy = SessionPolicy {
                tls_verify: self.settings.ssl_verify,
                ..SessionPolicy::default()
            };
            match (self.rebuild_session)(policy) {
                Ok(collaborators) => {
                    self.collaborators = collaborators;
                    self.view.set_insecure_warning(!self.settings.ssl_verify);
                }
                Err(e) => {
                    self.view
                        .show_failure(&format!("session rebuild failed: {e}"));
                }
            }
        }

        // A rebuilt session also means the running poller holds a stale
        // news source.
        if trust_changed || tickers_changed {
            self.start_news_poller().await;
        }
    }

    pub async fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SearchRequested(query) => self.begin_search(query),

            AppEvent::SearchCompleted { generation, result } => {
                if generation != self.search_generation {
                    tracing::debug!("dropping stale search completion (gen {generation})");
                    return;
                }
                self.view.set_busy(false);
                match result {
                    Ok(matches) => self.view.show_search_results(&matches),
                    Err(e) => self.view.show_failure(&e.to_string()),
                }
            }

            AppEvent::FetchCompleted {
                generation,
                symbol,
                result,
            } => {
                if generation != self.fetch_generation {
                    tracing::debug!("dropping stale fetch completion (gen {generation})");
                    return;
                }
                self.view.set_busy(false);
                match result {
                    Ok(series) => {
                        if self.settings.indicators.get("rsi").copied().unwrap_or(false) {
                            let panel = indicator_panel(series, RSI_AXIS);
                            self.view.show_series(&panel.series, &panel.overlays);
                        } else {
                            self.view.show_series(&series, &[]);
                        }
                    }
                    Err(e) => {
                        self.view.clear_chart();
                        self.view.show_failure(&format!("{symbol}: {e}"));
                    }
                }
            }

            AppEvent::NewsDiscovered(item) => {
                self.view.push_news(&item);
                if let Some(oracle) = self.loader.oracle() {
                    let fetcher = Arc::clone(&self.collaborators.articles);
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let enriched = analyze_item(item, Some(oracle), fetcher).await;
                        let _ = tx.send(AppEvent::NewsAnalyzed(enriched)).await;
                    });
                }
            }

            AppEvent::NewsAnalyzed(item) => self.view.update_news(&item),

            AppEvent::OracleState(state) => {
                tracing::info!("signal oracle: {}", state.label());
            }
        }
    }

    /// Main loop: consume events until ctrl-c or the channel closes, then
    /// wind the background tasks down.
    pub async fn run_until_shutdown(&mut self, rx: &mut mpsc::Receiver<AppEvent>) {
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("shutdown requested");
                    break;
                }
                maybe = rx.recv() => match maybe {
                    Some(event) => self.handle_event(event).await,
                    None => break,
                },
            }
        }
        self.shutdown().await;
    }

    pub async fn shutdown(&mut self) {
        if let Some(pending) = self.debounce.take() {
            pending.abort();
        }
        if let Some(poller) = self.poller.take() {
            poller.stop().await;
        }
        if let Some(forwarder) = self.news_forwarder.take() {
            forwarder.abort();
        }
    }
}
