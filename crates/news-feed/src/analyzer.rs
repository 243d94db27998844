use std::sync::Arc;

use tracker_core::{ArticleFetcher, NewsItem, SignalOracle};

/// Enrich one news item with a trading signal. Never fails outward: on any
/// internal error, or when no oracle is available, the item comes back
/// exactly as it went in (degraded mode, not an error).
///
/// Text resolution order: the item's inline text, else the article body
/// fetched from its link, else the title.
pub async fn analyze_item(
    mut item: NewsItem,
    oracle: Option<Arc<dyn SignalOracle>>,
    fetcher: Arc<dyn ArticleFetcher>,
) -> NewsItem {
    let Some(oracle) = oracle else {
        return item;
    };

    // At-most-once enrichment.
    if item.trading_signal.is_some() {
        return item;
    }

    let text = resolve_text(&item, fetcher.as_ref()).await;
    if text.trim().is_empty() {
        return item;
    }

    match oracle.generate_signal(&text, Some(&item.ticker)).await {
        Ok(signal) => {
            tracing::debug!(
                "signal for {}: {} ({}%)",
                item.link,
                signal.direction.to_label(),
                signal.confidence
            );
            item.trading_signal = Some(signal);
        }
        Err(e) => {
            tracing::warn!("signal generation failed for {}: {}", item.link, e);
        }
    }

    item
}

async fn resolve_text(item: &NewsItem, fetcher: &dyn ArticleFetcher) -> String {
    if let Some(text) = item.text.as_deref() {
        if !text.trim().is_empty() {
            return text.to_string();
        }
    }

    match fetcher.fetch_body_text(&item.link).await {
        Ok(body) if !body.trim().is_empty() => body,
        Ok(_) => item.title.clone(),
        Err(e) => {
            tracing::debug!("article fetch failed for {}: {}", item.link, e);
            item.title.clone()
        }
    }
}
