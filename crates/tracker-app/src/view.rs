use std::collections::VecDeque;

use technical_analysis::OverlayLine;
use tracker_core::{NewsItem, QuoteSeries, SymbolMatch};

/// Oldest news items are evicted past this cap.
pub const NEWS_DISPLAY_CAP: usize = 50;

/// The presentation surface the coordinator routes results to. The real
/// chart/window layer lives behind this seam; the bundled implementation
/// renders to the log.
pub trait TrackerView: Send {
    /// A fresh series (RSI column attached when the indicator is enabled,
    /// along with its reference lines).
    fn show_series(&mut self, series: &QuoteSeries, overlays: &[OverlayLine]);

    fn clear_chart(&mut self);

    fn show_search_results(&mut self, matches: &[SymbolMatch]);

    /// A newly discovered item, newest at the top of the feed.
    fn push_news(&mut self, item: &NewsItem);

    /// The enriched version of an item already on the feed.
    fn update_news(&mut self, item: &NewsItem);

    /// Short human-readable failure; replaces the current chart/list view.
    fn show_failure(&mut self, message: &str);

    /// Task-running / idle indicator.
    fn set_busy(&mut self, busy: bool);

    /// Persistent warning while TLS verification is disabled.
    fn set_insecure_warning(&mut self, active: bool);
}

/// Headless view: logs everything and keeps the bounded news feed that a
/// widget sidebar would otherwise own.
#[derive(Default)]
pub struct ConsoleView {
    news: VecDeque<NewsItem>,
}

impl ConsoleView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn news(&self) -> impl Iterator<Item = &NewsItem> {
        self.news.iter()
    }
}

impl TrackerView for ConsoleView {
    fn show_series(&mut self, series: &QuoteSeries, overlays: &[OverlayLine]) {
        tracing::info!(
            "chart: {} [{}] {} bars{}",
            series.symbol,
            series.timeframe.label(),
            series.bars.len(),
            if series.rsi.is_some() {
                format!(", RSI + {} overlay line(s)", overlays.len())
            } else {
                String::new()
            }
        );
    }

    fn clear_chart(&mut self) {
        tracing::info!("chart cleared");
    }

    fn show_search_results(&mut self, matches: &[SymbolMatch]) {
        for m in matches {
            tracing::info!("  {} - {}", m.symbol, m.name);
        }
    }

    fn push_news(&mut self, item: &NewsItem) {
        tracing::info!("[{}] {} :: {}", item.source, item.ticker, item.title);
        self.news.push_front(item.clone());
        while self.news.len() > NEWS_DISPLAY_CAP {
            self.news.pop_back();
        }
    }

    fn update_news(&mut self, item: &NewsItem) {
        if let Some(signal) = &item.trading_signal {
            tracing::info!(
                "signal {} {}% :: {}",
                signal.direction.to_label(),
                signal.confidence,
                item.title
            );
        }
        if let Some(existing) = self.news.iter_mut().find(|n| n.link == item.link) {
            *existing = item.clone();
        }
    }

    fn show_failure(&mut self, message: &str) {
        tracing::error!("{}", message);
    }

    fn set_busy(&mut self, busy: bool) {
        tracing::debug!("busy: {}", busy);
    }

    fn set_insecure_warning(&mut self, active: bool) {
        if active {
            tracing::warn!("TLS verification disabled - insecure session active");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn item(n: usize) -> NewsItem {
        NewsItem {
            source: "Test".to_string(),
            ticker: "NVDA".to_string(),
            title: format!("headline {n}"),
            link: format!("https://example.com/{n}"),
            publisher: None,
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            text: None,
            trading_signal: None,
        }
    }

    #[test]
    fn news_feed_is_bounded_with_oldest_evicted() {
        let mut view = ConsoleView::new();
        for n in 0..NEWS_DISPLAY_CAP + 10 {
            view.push_news(&item(n));
        }

        let links: Vec<_> = view.news().map(|i| i.link.clone()).collect();
        assert_eq!(links.len(), NEWS_DISPLAY_CAP);
        // Newest first; the ten oldest fell off the back.
        assert_eq!(links[0], item(NEWS_DISPLAY_CAP + 9).link);
        assert_eq!(links[NEWS_DISPLAY_CAP - 1], item(10).link);
    }

    #[test]
    fn update_replaces_matching_item_in_place() {
        let mut view = ConsoleView::new();
        view.push_news(&item(1));
        view.push_news(&item(2));

        let mut enriched = item(1);
        enriched.trading_signal = Some(tracker_core::TradingSignal {
            direction: tracker_core::SignalDirection::Bullish,
            confidence: 65,
            stop_loss: None,
            take_profit: None,
        });
        view.update_news(&enriched);

        let stored = view.news().find(|n| n.link == enriched.link).unwrap();
        assert!(stored.trading_signal.is_some());
    }
}
