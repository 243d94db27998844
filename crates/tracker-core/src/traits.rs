use async_trait::async_trait;

use crate::clean::RawQuoteTable;
use crate::{NewsItem, SymbolMatch, Timeframe, TrackerError, TradingSignal};

/// Market-data provider: symbol search and OHLCV history.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolMatch>, TrackerError>;

    async fn fetch_history(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<RawQuoteTable, TrackerError>;
}

/// News source: candidate items for a watched ticker set, newest first.
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch_news(&self, tickers: &[String]) -> Result<Vec<NewsItem>, TrackerError>;
}

/// Article body fetcher. Returns plain text, truncated to a bounded length
/// with an explicit truncation marker.
#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    async fn fetch_body_text(&self, url: &str) -> Result<String, TrackerError>;
}

/// Sentiment/trading-signal oracle. May be entirely absent at runtime;
/// callers treat absence as degraded mode, not an error.
#[async_trait]
pub trait SignalOracle: Send + Sync {
    async fn generate_signal(
        &self,
        text: &str,
        ticker: Option<&str>,
    ) -> Result<TradingSignal, TrackerError>;
}
