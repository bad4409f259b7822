//! Lexicon-based sentiment scoring
//!
//! Polarity of a piece of free text in [-1, 1]:
//! - each known word contributes its lexicon polarity
//! - an intensifier ("very", "extremely") scales the next sentiment word
//! - a negator ("not", "never", "don't") within the preceding window flips
//!   the word with damping
//! - exclamation marks add emphasis
//!
//! The score is the mean over sentiment-bearing words, clamped.

mod lexicon;

pub use lexicon::Lexicon;

use crate::types::{SentimentLabel, SentimentResult};
use tracing::debug;

/// Tokens after a negator that it still applies to
const NEGATION_WINDOW: usize = 3;
const NEGATION_FACTOR: f64 = -0.5;
/// Per-'!' emphasis, counted up to `MAX_EXCLAMATIONS`
const EXCLAMATION_BOOST: f64 = 0.1;
const MAX_EXCLAMATIONS: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct SentimentScorer {
    lexicon: Lexicon,
}

impl SentimentScorer {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn score(&self, text: &str) -> SentimentResult {
        if text.trim().is_empty() {
            return SentimentResult::neutral();
        }

        let tokens = tokenize(text);
        let mut total = 0.0;
        let mut scored = 0usize;
        let mut modifier = 1.0;
        let mut negation_left = 0usize;

        for token in &tokens {
            if self.lexicon.is_negator(token) {
                negation_left = NEGATION_WINDOW;
                continue;
            }

            if let Some(m) = self.lexicon.intensity(token) {
                modifier = m;
            } else if let Some(base) = self.lexicon.polarity(token) {
                let mut value = base * modifier;
                if negation_left > 0 {
                    value *= NEGATION_FACTOR;
                }
                total += value;
                scored += 1;
                modifier = 1.0;
            } else {
                modifier = 1.0;
            }

            negation_left = negation_left.saturating_sub(1);
        }

        if scored == 0 {
            return SentimentResult::neutral();
        }

        let exclamations = text.matches('!').count().min(MAX_EXCLAMATIONS);
        let emphasis = 1.0 + EXCLAMATION_BOOST * exclamations as f64;
        let polarity = (total / scored as f64 * emphasis).clamp(-1.0, 1.0);

        debug!(
            "Sentiment {:.3} from {} of {} tokens",
            polarity,
            scored,
            tokens.len()
        );

        SentimentResult {
            polarity,
            label: SentimentLabel::from_polarity(polarity),
        }
    }
}

/// Lowercased words; apostrophes stay inside words so "don't" survives
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
        .map(|w| w.trim_matches(|c: char| c == '\'' || c == '\u{2019}'))
        .filter(|w| !w.is_empty())
        .map(|w| w.replace('\u{2019}', "'").to_lowercase())
        .collect()
}
