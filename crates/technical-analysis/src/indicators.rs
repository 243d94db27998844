/// Default RSI lookback, matching the charting convention.
pub const RSI_PERIOD: usize = 14;

/// Relative Strength Index over closing prices, as a rolling simple mean of
/// gains vs. losses.
///
/// The output is index-aligned with the input: entry `i` is the RSI of the
/// trailing `period`-bar window ending at bar `i`. A window of `period` bars
/// contains `period - 1` price deltas, so the first `period - 1` entries are
/// `None` rather than defaulted to zero.
///
/// Division-by-zero policy (tested, not a float artifact):
/// - loss 0 with gain > 0: RSI saturates at 100
/// - flat window (gain and loss both 0): RSI is 50, neutral
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = closes.len();
    if period < 2 || n < period {
        return vec![None; n];
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let window = period - 1;

    let mut out = vec![None; period - 1];
    for i in (period - 1)..n {
        // Deltas inside the window of bars (i - period + 1)..=i.
        let slice = &deltas[i - window..i];
        let gain: f64 = slice.iter().filter(|&&d| d > 0.0).sum::<f64>() / window as f64;
        let loss: f64 = slice.iter().filter(|&&d| d < 0.0).map(|d| -d).sum::<f64>() / window as f64;

        let value = if loss == 0.0 {
            if gain == 0.0 {
                50.0
            } else {
                100.0
            }
        } else {
            let rs = gain / loss;
            100.0 - (100.0 / (1.0 + rs))
        };
        out.push(Some(value));
    }

    out
}
