pub mod article;
pub mod session;

pub use article::HttpArticleFetcher;
pub use session::{ImpersonationProfile, SessionHandle, SessionPolicy};

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracker_core::{
    MarketDataProvider, NewsItem, NewsSource, QuoteType, RawQuoteTable, RawRow, SymbolMatch,
    Timeframe, TrackerError,
};

const BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Yahoo Finance client: symbol search, OHLCV chart history and ticker news
/// over one shared session handle.
#[derive(Clone)]
pub struct YahooClient {
    session: Arc<SessionHandle>,
}

impl YahooClient {
    pub fn new(session: Arc<SessionHandle>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<SessionHandle> {
        &self.session
    }

    async fn get_search(
        &self,
        query: &str,
        quotes_count: u32,
        news_count: u32,
    ) -> Result<SearchResponse, reqwest::Error> {
        self.session
            .client()
            .get(format!("{}/v1/finance/search", BASE_URL))
            .query(&[
                ("q", query),
                ("quotesCount", &quotes_count.to_string()),
                ("newsCount", &news_count.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Fetch news for one ticker. Items missing a title, link or timestamp
    /// are skipped, matching the provider's frequently-incomplete payloads.
    async fn fetch_ticker_news(&self, ticker: &str) -> Result<Vec<NewsItem>, reqwest::Error> {
        let response = self.get_search(ticker, 0, 10).await?;

        let items = response
            .news
            .into_iter()
            .filter_map(|story| {
                let title = story.title?;
                let link = story.link?;
                let timestamp = DateTime::from_timestamp(story.provider_publish_time?, 0)?;
                Some(NewsItem {
                    source: "Yahoo Finance".to_string(),
                    ticker: ticker.to_string(),
                    title,
                    link,
                    publisher: story.publisher,
                    timestamp,
                    text: None,
                    trading_signal: None,
                })
            })
            .collect();

        Ok(items)
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    /// One GET against the symbol-search endpoint, filtered to the
    /// instrument types the tracker charts. An empty query resolves to an
    /// empty list without touching the network.
    async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolMatch>, TrackerError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .get_search(query, 10, 0)
            .await
            .map_err(|e| TrackerError::SearchFailed(e.to_string()))?;

        Ok(response
            .quotes
            .into_iter()
            .filter_map(|quote| {
                let quote_type = QuoteType::from_provider(quote.quote_type.as_deref()?)?;
                Some(SymbolMatch {
                    symbol: quote.symbol?,
                    name: quote
                        .longname
                        .or(quote.shortname)
                        .unwrap_or_else(|| "No Name".to_string()),
                    quote_type,
                })
            })
            .collect())
    }

    /// OHLCV history for one (symbol, timeframe) request. Sub-daily
    /// timestamps are shifted to exchange-local naive time when the
    /// exchange offset is usable; otherwise the UTC instant is kept.
    async fn fetch_history(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<RawQuoteTable, TrackerError> {
        let (range, interval) = timeframe.range_interval();

        let response: ChartResponse = self
            .session
            .client()
            .get(format!("{}/v8/finance/chart/{}", BASE_URL, symbol))
            .query(&[("range", range), ("interval", interval), ("events", "div,splits")])
            .send()
            .await
            .map_err(|e| TrackerError::FetchFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| TrackerError::FetchFailed(e.to_string()))?
            .json()
            .await
            .map_err(|e| TrackerError::FetchFailed(e.to_string()))?;

        let result = response
            .chart
            .result
            .and_then(|mut r| (!r.is_empty()).then(|| r.remove(0)))
            .ok_or_else(|| TrackerError::FetchFailed("no data returned".to_string()))?;

        let timestamps = result.timestamp.unwrap_or_default();
        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .unwrap_or_default();

        if timestamps.is_empty() {
            return Err(TrackerError::FetchFailed("no data returned".to_string()));
        }

        let offset = if timeframe.is_intraday() {
            result
                .meta
                .and_then(|m| m.gmtoffset)
                .and_then(exchange_offset)
        } else {
            None
        };

        let cell = |column: &[Option<f64>], i: usize| -> Value {
            column
                .get(i)
                .copied()
                .flatten()
                .and_then(|v| serde_json::Number::from_f64(v).map(Value::Number))
                .unwrap_or(Value::Null)
        };

        let rows = timestamps
            .iter()
            .enumerate()
            .filter_map(|(i, &epoch)| {
                let utc: DateTime<Utc> = DateTime::from_timestamp(epoch, 0)?;
                // Offset conversion failure falls back to the UTC instant
                // rather than failing the fetch.
                let timestamp = match offset {
                    Some(off) => utc.with_timezone(&off).naive_local(),
                    None => utc.naive_utc(),
                };
                Some(RawRow {
                    timestamp,
                    open: cell(&quote.open, i),
                    high: cell(&quote.high, i),
                    low: cell(&quote.low, i),
                    close: cell(&quote.close, i),
                    volume: cell(&quote.volume, i),
                })
            })
            .collect();

        Ok(RawQuoteTable { rows })
    }
}

#[async_trait]
impl NewsSource for YahooClient {
    /// Candidate pool for the watched ticker set, newest first. Per-ticker
    /// failures are logged and skipped so one bad symbol cannot starve the
    /// rest of the feed.
    async fn fetch_news(&self, tickers: &[String]) -> Result<Vec<NewsItem>, TrackerError> {
        let mut pool = Vec::new();

        for ticker in tickers {
            match self.fetch_ticker_news(ticker).await {
                Ok(items) => pool.extend(items),
                Err(e) => {
                    tracing::debug!("news fetch for {} failed: {}", ticker, e);
                }
            }
        }

        pool.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(pool)
    }
}

/// Provider-supplied UTC offset in seconds. Values outside the valid
/// offset range are rejected rather than truncated into a plausible one.
fn exchange_offset(secs: i64) -> Option<FixedOffset> {
    i32::try_from(secs).ok().and_then(FixedOffset::east_opt)
}

// Search/news response structures
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
    #[serde(default)]
    news: Vec<NewsStory>,
}

#[derive(Debug, Deserialize)]
struct SearchQuote {
    symbol: Option<String>,
    #[serde(rename = "quoteType")]
    quote_type: Option<String>,
    longname: Option<String>,
    shortname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsStory {
    title: Option<String>,
    link: Option<String>,
    publisher: Option<String>,
    #[serde(rename = "providerPublishTime")]
    provider_publish_time: Option<i64>,
}

// Chart response structures
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_query_short_circuits_without_network() {
        // A client pointed at an unroutable session still resolves instantly
        // for an empty query, because no request is ever issued.
        let session = SessionHandle::build(SessionPolicy::default()).unwrap();
        let client = YahooClient::new(session);

        assert!(client.search_symbols("").await.unwrap().is_empty());
        assert!(client.search_symbols("   ").await.unwrap().is_empty());
    }

    #[test]
    fn out_of_range_gmtoffset_is_rejected_not_wrapped() {
        // US Eastern standard time.
        assert_eq!(exchange_offset(-18_000), FixedOffset::east_opt(-18_000));

        // Beyond a day in either direction, or not even an i32: no offset,
        // timestamps stay UTC.
        assert!(exchange_offset(100_000).is_none());
        assert!(exchange_offset(-100_000).is_none());
        assert!(exchange_offset(i64::from(i32::MAX) + 18_000).is_none());
    }
}
