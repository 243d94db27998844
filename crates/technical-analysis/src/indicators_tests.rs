#[cfg(test)]
mod tests {
    use super::super::indicators::*;
    use super::super::panel::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use tracker_core::{Bar, QuoteSeries, Timeframe};

    // Helper function to create sample price data
    fn sample_prices() -> Vec<f64> {
        vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ]
    }

    fn sample_series(closes: &[f64]) -> QuoteSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
                    + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000_000.0,
            })
            .collect();
        QuoteSeries {
            symbol: "TEST".to_string(),
            timeframe: Timeframe::OneYear,
            bars,
            rsi: None,
        }
    }

    #[test]
    fn test_rsi_output_aligned_with_input() {
        let prices = sample_prices();
        let result = rsi(&prices, RSI_PERIOD);

        assert_eq!(result.len(), prices.len());
        assert!(result[..RSI_PERIOD - 1].iter().all(|v| v.is_none()));
        assert!(result[RSI_PERIOD - 1..].iter().all(|v| v.is_some()));
    }

    #[test]
    fn test_rsi_values_bounded() {
        let prices = sample_prices();
        for value in rsi(&prices, RSI_PERIOD).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn test_rsi_saturates_at_100_on_monotonic_rise() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let result = rsi(&prices, RSI_PERIOD);

        for value in result[RSI_PERIOD - 1..].iter().flatten() {
            assert_relative_eq!(*value, 100.0);
        }
    }

    #[test]
    fn test_rsi_is_zero_on_monotonic_fall() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
        let result = rsi(&prices, RSI_PERIOD);

        for value in result[RSI_PERIOD - 1..].iter().flatten() {
            assert_relative_eq!(*value, 0.0);
        }
    }

    #[test]
    fn test_rsi_flat_series_is_neutral() {
        let prices = vec![42.0; 25];
        let result = rsi(&prices, RSI_PERIOD);

        assert!(result[..RSI_PERIOD - 1].iter().all(|v| v.is_none()));
        for value in result[RSI_PERIOD - 1..].iter().flatten() {
            assert_relative_eq!(*value, 50.0);
        }
    }

    #[test]
    fn test_rsi_short_input_is_all_none() {
        let prices = vec![1.0, 2.0, 3.0];
        let result = rsi(&prices, RSI_PERIOD);
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_rsi_degenerate_period() {
        let prices = sample_prices();
        assert!(rsi(&prices, 0).iter().all(|v| v.is_none()));
        assert!(rsi(&prices, 1).iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_panel_attaches_rsi_and_reference_lines() {
        let series = sample_series(&sample_prices());
        let bar_count = series.bars.len();
        let panel = indicator_panel(series, PanelAxis(2));

        let column = panel.series.rsi.as_ref().expect("rsi column attached");
        assert_eq!(column.len(), bar_count);

        assert_eq!(panel.overlays.len(), 2);
        assert_relative_eq!(panel.overlays[0].value, OVERBOUGHT_LEVEL);
        assert_relative_eq!(panel.overlays[1].value, OVERSOLD_LEVEL);
        assert!(panel.overlays.iter().all(|o| o.axis == PanelAxis(2)));
    }

    #[test]
    fn test_panel_is_pure_over_input() {
        let series = sample_series(&sample_prices());
        let first = indicator_panel(series.clone(), PanelAxis(1));
        let second = indicator_panel(series, PanelAxis(1));
        assert_eq!(first.series.rsi, second.series.rsi);
        assert_eq!(first.overlays, second.overlays);
    }
}
