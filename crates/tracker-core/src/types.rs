use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar data. Intraday timestamps are timezone-naive exchange-local
/// time; daily and coarser bars carry the naive UTC session date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A clean, time-ordered, duplicate-free series of bars for one
/// (symbol, timeframe) pair. Immutable once handed to the view; the next
/// fetch replaces it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSeries {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub bars: Vec<Bar>,
    /// RSI column, index-aligned with `bars`. Present only when the
    /// indicator is enabled; first `period - 1` entries have no value.
    #[serde(default)]
    pub rsi: Option<Vec<Option<f64>>>,
}

impl QuoteSeries {
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

/// Fixed set of chartable timeframe profiles: lookback span + sampling
/// interval, in the provider's range/interval vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    OneDay,
    FiveDays,
    OneMonth,
    SixMonths,
    OneYear,
    FiveYears,
}

impl Timeframe {
    /// Resolve to the provider's (range, interval) pair.
    pub fn range_interval(&self) -> (&'static str, &'static str) {
        match self {
            Timeframe::OneDay => ("1d", "2m"),
            Timeframe::FiveDays => ("5d", "15m"),
            Timeframe::OneMonth => ("1mo", "1h"),
            Timeframe::SixMonths => ("6mo", "1d"),
            Timeframe::OneYear => ("1y", "1d"),
            Timeframe::FiveYears => ("5y", "1wk"),
        }
    }

    /// Sub-daily sampling: timestamps get normalized to naive local time.
    pub fn is_intraday(&self) -> bool {
        matches!(
            self,
            Timeframe::OneDay | Timeframe::FiveDays | Timeframe::OneMonth
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::OneDay => "1d",
            Timeframe::FiveDays => "5d",
            Timeframe::OneMonth => "1mo",
            Timeframe::SixMonths => "6mo",
            Timeframe::OneYear => "1y",
            Timeframe::FiveYears => "5y",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "1d" => Some(Timeframe::OneDay),
            "5d" => Some(Timeframe::FiveDays),
            "1mo" => Some(Timeframe::OneMonth),
            "6mo" => Some(Timeframe::SixMonths),
            "1y" => Some(Timeframe::OneYear),
            "5y" => Some(Timeframe::FiveYears),
            _ => None,
        }
    }
}

/// Instrument classes surfaced by symbol search; everything else is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteType {
    Equity,
    Etf,
    Cryptocurrency,
    Future,
}

impl QuoteType {
    pub fn from_provider(s: &str) -> Option<Self> {
        match s {
            "EQUITY" => Some(QuoteType::Equity),
            "ETF" => Some(QuoteType::Etf),
            "CRYPTOCURRENCY" => Some(QuoteType::Cryptocurrency),
            "FUTURE" => Some(QuoteType::Future),
            _ => None,
        }
    }
}

/// One ranked symbol-search candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolMatch {
    pub symbol: String,
    pub name: String,
    pub quote_type: QuoteType,
}

/// User watchlist entry, unique by symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub symbol: String,
    pub name: String,
}

/// A discovered news item. Identity (and dedup key) is `link`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub source: String,
    pub ticker: String,
    pub title: String,
    pub link: String,
    pub publisher: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Inline body text when the source carries one; otherwise resolved
    /// lazily by the analysis task.
    pub text: Option<String>,
    /// Attached at most once by the analysis task; absent in degraded mode.
    #[serde(default)]
    pub trading_signal: Option<TradingSignal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalDirection {
    Bullish,
    Bearish,
    Neutral,
}

impl SignalDirection {
    pub fn to_label(&self) -> &'static str {
        match self {
            SignalDirection::Bullish => "BULLISH",
            SignalDirection::Bearish => "BEARISH",
            SignalDirection::Neutral => "NEUTRAL",
        }
    }
}

/// Oracle verdict for one news item. Immutable after attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingSignal {
    pub direction: SignalDirection,
    /// 0..=100
    pub confidence: u8,
    /// Signed percentage string, e.g. "-2.5%".
    pub stop_loss: Option<String>,
    /// Signed percentage string, e.g. "+5.0%".
    pub take_profit: Option<String>,
}
