use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tracker_core::{SignalOracle, TrackerError};

/// Lifecycle of the heavyweight oracle dependency, exposed as explicit
/// states instead of a hidden memoization cache. Absence (`NotRequested`,
/// `Loading`, `Failed`) means the news pipeline runs in degraded mode.
#[derive(Clone)]
pub enum OracleLoadState {
    NotRequested,
    Loading,
    Ready(Arc<dyn SignalOracle>),
    Failed(String),
}

impl OracleLoadState {
    pub fn label(&self) -> &'static str {
        match self {
            OracleLoadState::NotRequested => "not requested",
            OracleLoadState::Loading => "loading",
            OracleLoadState::Ready(_) => "ready",
            OracleLoadState::Failed(_) => "failed",
        }
    }
}

impl fmt::Debug for OracleLoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleLoadState::Failed(msg) => write!(f, "Failed({msg})"),
            other => f.write_str(other.label()),
        }
    }
}

/// Drives one asynchronous oracle load and publishes the state over a watch
/// channel the coordinator can observe.
pub struct OracleLoader {
    state_tx: watch::Sender<OracleLoadState>,
}

impl OracleLoader {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(OracleLoadState::NotRequested);
        Self { state_tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<OracleLoadState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> OracleLoadState {
        self.state_tx.borrow().clone()
    }

    /// The oracle capability, present only once a load has completed.
    pub fn oracle(&self) -> Option<Arc<dyn SignalOracle>> {
        match &*self.state_tx.borrow() {
            OracleLoadState::Ready(oracle) => Some(Arc::clone(oracle)),
            _ => None,
        }
    }

    /// Start loading unless a load is already running or finished. A failed
    /// load may be retried.
    pub fn request_load<F, Fut>(&self, load: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Arc<dyn SignalOracle>, TrackerError>> + Send,
    {
        {
            let current = self.state_tx.borrow();
            if matches!(
                &*current,
                OracleLoadState::Loading | OracleLoadState::Ready(_)
            ) {
                return;
            }
        }

        // send_replace, not send: the state must persist even when nothing
        // subscribes, or an unobserved loader would stay NotRequested.
        self.state_tx.send_replace(OracleLoadState::Loading);
        let state_tx = self.state_tx.clone();

        tokio::spawn(async move {
            let next = match load().await {
                Ok(oracle) => {
                    tracing::info!("signal oracle loaded");
                    OracleLoadState::Ready(oracle)
                }
                Err(e) => {
                    tracing::warn!("signal oracle failed to load: {}", e);
                    OracleLoadState::Failed(e.to_string())
                }
            };
            state_tx.send_replace(next);
        });
    }
}

impl Default for OracleLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeywordOracle;

    #[tokio::test]
    async fn load_transitions_to_ready() {
        let loader = OracleLoader::new();
        assert!(matches!(loader.state(), OracleLoadState::NotRequested));
        assert!(loader.oracle().is_none());

        let mut rx = loader.subscribe();
        loader.request_load(|| async {
            Ok(Arc::new(KeywordOracle::new()) as Arc<dyn SignalOracle>)
        });

        while !matches!(&*rx.borrow(), OracleLoadState::Ready(_)) {
            rx.changed().await.unwrap();
        }
        assert!(loader.oracle().is_some());
    }

    #[tokio::test]
    async fn unobserved_loader_still_reaches_ready() {
        // No subscriber anywhere; transitions must land via state()/oracle()
        // alone.
        let loader = OracleLoader::new();
        loader.request_load(|| async {
            Ok(Arc::new(KeywordOracle::new()) as Arc<dyn SignalOracle>)
        });

        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while loader.oracle().is_none() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("load completed without a subscriber");

        assert!(matches!(loader.state(), OracleLoadState::Ready(_)));
        // The duplicate-load guard still sees the terminal state.
        loader.request_load(|| async {
            Err(TrackerError::SessionError("should not run".to_string()))
        });
        assert!(matches!(loader.state(), OracleLoadState::Ready(_)));
    }

    #[tokio::test]
    async fn failed_load_is_reported_and_retriable() {
        let loader = OracleLoader::new();
        let mut rx = loader.subscribe();

        loader.request_load(|| async {
            Err(TrackerError::SessionError("weights missing".to_string()))
        });
        while !matches!(&*rx.borrow(), OracleLoadState::Failed(_)) {
            rx.changed().await.unwrap();
        }
        assert!(loader.oracle().is_none());

        // A failed load may be requested again.
        loader.request_load(|| async {
            Ok(Arc::new(KeywordOracle::new()) as Arc<dyn SignalOracle>)
        });
        while !matches!(&*rx.borrow(), OracleLoadState::Ready(_)) {
            rx.changed().await.unwrap();
        }
        assert!(loader.oracle().is_some());
    }

    #[tokio::test]
    async fn ready_loader_ignores_further_requests() {
        let loader = OracleLoader::new();
        let mut rx = loader.subscribe();
        loader.request_load(|| async {
            Ok(Arc::new(KeywordOracle::new()) as Arc<dyn SignalOracle>)
        });
        while !matches!(&*rx.borrow(), OracleLoadState::Ready(_)) {
            rx.changed().await.unwrap();
        }

        loader.request_load(|| async {
            Err(TrackerError::SessionError("should not run".to_string()))
        });
        // State stays ready.
        assert!(matches!(loader.state(), OracleLoadState::Ready(_)));
    }
}
