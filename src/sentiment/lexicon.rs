//! Word polarity lexicon
//!
//! General-purpose opinion words with TextBlob-scale polarities plus a
//! handful of market terms. Values are in [-1, 1].

use std::collections::HashMap;

const POLARITIES: &[(&str, f64)] = &[
    // positive
    ("love", 0.5),
    ("loved", 0.7),
    ("like", 0.2),
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("excellent", 1.0),
    ("great", 0.8),
    ("good", 0.7),
    ("nice", 0.6),
    ("best", 1.0),
    ("better", 0.5),
    ("happy", 0.8),
    ("wonderful", 1.0),
    ("fantastic", 0.4),
    ("incredible", 0.9),
    ("strong", 0.43),
    ("positive", 0.23),
    ("optimistic", 0.5),
    ("confident", 0.5),
    ("win", 0.8),
    ("winning", 0.5),
    ("profit", 0.5),
    ("profitable", 0.5),
    ("gains", 0.5),
    ("gain", 0.4),
    ("bullish", 0.6),
    ("rally", 0.5),
    ("surge", 0.5),
    ("soar", 0.6),
    ("moon", 0.6),
    ("breakout", 0.4),
    ("recovery", 0.3),
    ("adoption", 0.3),
    ("upgrade", 0.3),
    ("safe", 0.5),
    // negative
    ("terrible", -1.0),
    ("awful", -1.0),
    ("horrible", -1.0),
    ("worst", -1.0),
    ("bad", -0.7),
    ("worse", -0.4),
    ("poor", -0.4),
    ("hate", -0.8),
    ("sad", -0.5),
    ("angry", -0.5),
    ("afraid", -0.6),
    ("fear", -0.6),
    ("panic", -0.6),
    ("weak", -0.38),
    ("negative", -0.3),
    ("pessimistic", -0.5),
    ("risky", -0.4),
    ("crash", -0.7),
    ("crashing", -0.7),
    ("dump", -0.5),
    ("dumping", -0.5),
    ("bearish", -0.6),
    ("plunge", -0.6),
    ("drop", -0.3),
    ("loss", -0.5),
    ("losses", -0.5),
    ("lose", -0.5),
    ("losing", -0.5),
    ("scam", -0.8),
    ("hack", -0.6),
    ("hacked", -0.7),
    ("fraud", -0.8),
    ("ban", -0.4),
    ("collapse", -0.7),
    ("bubble", -0.3),
    ("rekt", -0.8),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("extremely", 1.5),
    ("super", 1.4),
    ("so", 1.2),
    ("totally", 1.3),
    ("incredibly", 1.5),
    ("absolutely", 1.4),
    ("highly", 1.3),
    ("slightly", 0.5),
    ("somewhat", 0.6),
    ("barely", 0.4),
];

const NEGATORS: &[&str] = &["not", "no", "never", "nor", "without", "cannot"];

#[derive(Debug, Clone)]
pub struct Lexicon {
    polarities: HashMap<&'static str, f64>,
    intensifiers: HashMap<&'static str, f64>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self {
            polarities: POLARITIES.iter().copied().collect(),
            intensifiers: INTENSIFIERS.iter().copied().collect(),
        }
    }

    /// Polarity of a lowercase word, if it carries any
    pub fn polarity(&self, word: &str) -> Option<f64> {
        self.polarities.get(word).copied()
    }

    /// Multiplier applied to the next sentiment word
    pub fn intensity(&self, word: &str) -> Option<f64> {
        self.intensifiers.get(word).copied()
    }

    pub fn is_negator(&self, word: &str) -> bool {
        NEGATORS.contains(&word) || word.ends_with("n't")
    }

    pub fn len(&self) -> usize {
        self.polarities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polarities.is_empty()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new()
    }
}
