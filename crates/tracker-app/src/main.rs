use std::sync::Arc;

use anyhow::{Context, Result};
use signal_oracle::{KeywordOracle, OracleLoader};
use tokio::sync::mpsc;
use tracker_core::SignalOracle;
use yahoo_client::{HttpArticleFetcher, SessionHandle, SessionPolicy, YahooClient};

mod coordinator;
mod events;
mod view;

use coordinator::{Collaborators, Coordinator, SessionFactory};
use events::AppEvent;
use settings_store::SettingsStore;
use view::ConsoleView;

const EVENT_CHANNEL_CAPACITY: usize = 256;

fn collaborators_for(policy: SessionPolicy) -> Result<Collaborators, tracker_core::TrackerError> {
    let session = SessionHandle::build(policy)?;
    let client = YahooClient::new(Arc::clone(&session));
    Ok(Collaborators {
        market: Arc::new(client.clone()),
        news: Arc::new(client),
        articles: Arc::new(HttpArticleFetcher::new(session)),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env, init tracing
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting tickerdesk");

    // 2. Settings: missing or malformed files fall back to defaults.
    let settings_path =
        std::env::var("TICKERDESK_SETTINGS").unwrap_or_else(|_| "settings.json".to_string());
    let store = SettingsStore::new(&settings_path);
    let settings = store.load();
    tracing::info!("  Settings file: {settings_path}");
    tracing::info!("  Timeframe: {}", settings.timeframe);
    tracing::info!("  News tickers: {}", settings.news_tickers.join(", "));
    tracing::info!("  TLS verify: {}", settings.ssl_verify);

    // 3. Initial HTTP session. This is the only fatal startup path: without
    // a session no collaborator can be constructed.
    let policy = SessionPolicy {
        tls_verify: settings.ssl_verify,
        ..SessionPolicy::default()
    };
    let collaborators =
        collaborators_for(policy).context("failed to build the initial HTTP session")?;

    // 4. Oracle load runs in the background; until it finishes the news
    // pipeline simply emits unanalyzed items.
    let loader = Arc::new(OracleLoader::new());
    let (tx, mut rx) = mpsc::channel::<AppEvent>(EVENT_CHANNEL_CAPACITY);

    let mut oracle_states = loader.subscribe();
    let state_tx = tx.clone();
    tokio::spawn(async move {
        while oracle_states.changed().await.is_ok() {
            let state = oracle_states.borrow_and_update().clone();
            if state_tx.send(AppEvent::OracleState(state)).await.is_err() {
                break;
            }
        }
    });
    loader.request_load(|| async {
        Ok(Arc::new(KeywordOracle::new()) as Arc<dyn SignalOracle>)
    });

    // 5. Coordinator owns the view and every task lifecycle.
    let rebuild: SessionFactory = Box::new(collaborators_for);
    let mut coordinator = Coordinator::new(
        ConsoleView::new(),
        collaborators,
        rebuild,
        Arc::clone(&loader),
        store,
        tx,
    );
    coordinator.start_news_poller().await;

    coordinator.run_until_shutdown(&mut rx).await;
    tracing::info!("tickerdesk stopped");
    Ok(())
}
