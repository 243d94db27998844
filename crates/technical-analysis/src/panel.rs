use serde::{Deserialize, Serialize};
use tracker_core::QuoteSeries;

use crate::indicators::{rsi, RSI_PERIOD};

pub const OVERBOUGHT_LEVEL: f64 = 70.0;
pub const OVERSOLD_LEVEL: f64 = 30.0;

/// Opaque handle for the drawing surface an overlay is bound to. The
/// rendering layer owns the mapping; this crate never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelAxis(pub u32);

/// A constant horizontal reference line for the indicator panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayLine {
    pub axis: PanelAxis,
    pub value: f64,
    pub label: &'static str,
}

/// The RSI column attached to a series plus its renderable reference lines.
#[derive(Debug, Clone)]
pub struct IndicatorPanel {
    pub series: QuoteSeries,
    pub overlays: Vec<OverlayLine>,
}

/// Attach a 14-period RSI column to the series and produce the overbought/
/// oversold reference lines for the given panel axis. Pure over its input;
/// the returned series is a new value, recomputed on every call.
pub fn indicator_panel(mut series: QuoteSeries, axis: PanelAxis) -> IndicatorPanel {
    let closes = series.closes();
    series.rsi = Some(rsi(&closes, RSI_PERIOD));

    IndicatorPanel {
        series,
        overlays: vec![
            OverlayLine {
                axis,
                value: OVERBOUGHT_LEVEL,
                label: "overbought",
            },
            OverlayLine {
                axis,
                value: OVERSOLD_LEVEL,
                label: "oversold",
            },
        ],
    }
}
