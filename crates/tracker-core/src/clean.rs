use chrono::NaiveDateTime;
use serde_json::Value;

use crate::{Bar, QuoteSeries, Timeframe, TrackerError};

/// One raw row as delivered by the provider: cells may be numbers, numeric
/// strings, or null.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub timestamp: NaiveDateTime,
    pub open: Value,
    pub high: Value,
    pub low: Value,
    pub close: Value,
    pub volume: Value,
}

/// Raw OHLCV table keyed by timestamp, before cleaning.
#[derive(Debug, Clone, Default)]
pub struct RawQuoteTable {
    pub rows: Vec<RawRow>,
}

impl RawQuoteTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Coerce a raw cell to a finite number. Strings are parsed; anything else
/// (null, bool, non-numeric text, NaN/inf) is treated as missing.
fn coerce_numeric(cell: &Value) -> Option<f64> {
    let v = match cell {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

/// Normalize a raw table into a clean series: coerce every OHLCV cell to
/// numeric, drop rows with any missing cell, order by timestamp with
/// duplicates collapsed (last occurrence wins).
///
/// Works on a copy of the input; the caller's table is left untouched.
/// Fails with `DataUnavailable` if the table is empty before or after
/// cleaning.
pub fn clean(
    symbol: &str,
    timeframe: Timeframe,
    raw: &RawQuoteTable,
) -> Result<QuoteSeries, TrackerError> {
    if raw.is_empty() {
        return Err(TrackerError::DataUnavailable(format!(
            "empty quote table for {symbol}"
        )));
    }

    let mut bars: Vec<Bar> = raw
        .rows
        .iter()
        .filter_map(|row| {
            Some(Bar {
                timestamp: row.timestamp,
                open: coerce_numeric(&row.open)?,
                high: coerce_numeric(&row.high)?,
                low: coerce_numeric(&row.low)?,
                close: coerce_numeric(&row.close)?,
                volume: coerce_numeric(&row.volume)?,
            })
        })
        .collect();

    if bars.is_empty() {
        return Err(TrackerError::DataUnavailable(format!(
            "no valid rows for {symbol} after cleaning"
        )));
    }

    // Stable sort keeps provider order among equal timestamps, so keeping
    // the last duplicate matches "most recent row wins".
    bars.sort_by_key(|b| b.timestamp);
    let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match deduped.last_mut() {
            Some(last) if last.timestamp == bar.timestamp => *last = bar,
            _ => deduped.push(bar),
        }
    }

    Ok(QuoteSeries {
        symbol: symbol.to_string(),
        timeframe,
        bars: deduped,
        rsi: None,
    })
}
