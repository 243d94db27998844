use signal_oracle::OracleLoadState;
use tracker_core::{NewsItem, QuoteSeries, SymbolMatch, TrackerError};

/// Messages delivered from background tasks to the coordinator. The
/// coordinator consumes them one at a time, in delivery order; no task
/// result reaches the presentation layer any other way.
#[derive(Debug)]
pub enum AppEvent {
    /// A debounce window elapsed; start the search now.
    SearchRequested(String),
    /// A search task finished. Stale generations are dropped.
    SearchCompleted {
        generation: u64,
        result: Result<Vec<SymbolMatch>, TrackerError>,
    },
    /// A quote fetch task finished. Stale generations are dropped.
    FetchCompleted {
        generation: u64,
        symbol: String,
        result: Result<QuoteSeries, TrackerError>,
    },
    /// The news poller discovered a new item.
    NewsDiscovered(NewsItem),
    /// An analysis task finished enriching an item.
    NewsAnalyzed(NewsItem),
    /// The oracle load task changed state.
    OracleState(OracleLoadState),
}
