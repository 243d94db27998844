use async_trait::async_trait;
use tracker_core::{SignalDirection, SignalOracle, TrackerError, TradingSignal};

const POSITIVE_KEYWORDS: [&str; 16] = [
    "surges", "rally", "gains", "profit", "growth", "beats", "exceeds", "strong", "bullish",
    "upgrade", "optimistic", "breakthrough", "success", "record", "high", "soars",
];

const NEGATIVE_KEYWORDS: [&str; 16] = [
    "falls", "plunges", "losses", "decline", "weak", "misses", "cuts", "drops", "bearish",
    "downgrade", "pessimistic", "failure", "concern", "warning", "low", "crashes",
];

/// Built-in keyword-count oracle. Stands in when no heavier model is
/// loaded; the keyword lists and the verdict mapping come from the
/// sentiment fallback this tracker always ships with.
#[derive(Debug, Default, Clone)]
pub struct KeywordOracle;

impl KeywordOracle {
    pub fn new() -> Self {
        Self
    }

    /// Keyword-count sentiment in [-1.0, 1.0]; 0.0 when no keyword hits.
    fn sentiment_score(text: &str) -> f64 {
        let text = text.to_lowercase();

        let positive: i32 = POSITIVE_KEYWORDS
            .iter()
            .map(|kw| text.matches(kw).count() as i32)
            .sum();
        let negative: i32 = NEGATIVE_KEYWORDS
            .iter()
            .map(|kw| text.matches(kw).count() as i32)
            .sum();

        let total = positive + negative;
        if total == 0 {
            return 0.0;
        }
        ((positive - negative) as f64 / total as f64).clamp(-1.0, 1.0)
    }
}

#[async_trait]
impl SignalOracle for KeywordOracle {
    async fn generate_signal(
        &self,
        text: &str,
        _ticker: Option<&str>,
    ) -> Result<TradingSignal, TrackerError> {
        if text.trim().is_empty() {
            return Ok(TradingSignal {
                direction: SignalDirection::Neutral,
                confidence: 0,
                stop_loss: None,
                take_profit: None,
            });
        }

        let score = Self::sentiment_score(text);
        let signal = if score > 0.0 {
            TradingSignal {
                direction: SignalDirection::Bullish,
                confidence: 65,
                stop_loss: Some("-2.5%".to_string()),
                take_profit: Some("+5.0%".to_string()),
            }
        } else if score < 0.0 {
            TradingSignal {
                direction: SignalDirection::Bearish,
                confidence: 65,
                stop_loss: Some("-2.5%".to_string()),
                take_profit: Some("-3.0%".to_string()),
            }
        } else {
            TradingSignal {
                direction: SignalDirection::Neutral,
                confidence: 50,
                stop_loss: None,
                take_profit: None,
            }
        };

        Ok(signal)
    }
}
