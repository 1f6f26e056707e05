//! Bayes model types and data structures

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A lower-cased word-like unit of message text
pub type Token = String;

/// Distinct tokens of one message. Ordered so that equal sets hash, compare
/// and iterate identically.
pub type TokenSet = BTreeSet<Token>;

/// A message's token set together with its class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledMessage {
    pub tokens: TokenSet,
    pub is_spam: bool,
}

impl LabeledMessage {
    pub fn new(tokens: TokenSet, is_spam: bool) -> Self {
        Self { tokens, is_spam }
    }

    pub fn spam(tokens: TokenSet) -> Self {
        Self::new(tokens, true)
    }

    pub fn ham(tokens: TokenSet) -> Self {
        Self::new(tokens, false)
    }
}

/// Number of messages of each class that contained a token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenCounts {
    pub spam: u32,
    pub ham: u32,
}

impl TokenCounts {
    /// Counts for a token seen in exactly one message of the given class
    pub fn first(is_spam: bool) -> Self {
        if is_spam {
            Self { spam: 1, ham: 0 }
        } else {
            Self { spam: 0, ham: 1 }
        }
    }

    pub fn increment(&mut self, is_spam: bool) {
        if is_spam {
            self.spam += 1;
        } else {
            self.ham += 1;
        }
    }
}

/// Smoothed conditional probabilities `(P(t|spam), P(t|ham))`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenProbabilities {
    pub spam: f64,
    pub ham: f64,
}

impl TokenProbabilities {
    /// `|P(t|spam) - P(t|ham)|`
    pub fn separation(&self) -> f64 {
        (self.spam - self.ham).abs()
    }

    /// `ln(P(t|spam) / P(t|ham))`, the token's contribution to a score
    pub fn log_ratio(&self) -> f64 {
        (self.spam / self.ham).ln()
    }
}

/// Estimated model. Only the estimator constructs one, so every instance
/// holds smoothed and pruned probabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    store: BTreeMap<Token, TokenProbabilities>,
    spam_prior: f64,
    spam_count: u32,
    ham_count: u32,
}

impl Model {
    pub(crate) fn new(
        store: BTreeMap<Token, TokenProbabilities>,
        spam_count: u32,
        ham_count: u32,
    ) -> Self {
        let spam_prior = spam_count as f64 / (spam_count as f64 + ham_count as f64);
        Self {
            store,
            spam_prior,
            spam_count,
            ham_count,
        }
    }

    /// Fraction of training messages that were spam
    pub fn spam_prior(&self) -> f64 {
        self.spam_prior
    }

    /// `ln(P(spam) / P(ham))`, the score of a message with no known tokens
    pub fn prior_log_odds(&self) -> f64 {
        (self.spam_prior / (1.0 - self.spam_prior)).ln()
    }

    pub fn spam_count(&self) -> u32 {
        self.spam_count
    }

    pub fn ham_count(&self) -> u32 {
        self.ham_count
    }

    pub fn get(&self, token: &str) -> Option<&TokenProbabilities> {
        self.store.get(token)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.store.contains_key(token)
    }

    /// Tokens with their probabilities, in token order
    pub fn tokens(&self) -> impl Iterator<Item = (&str, &TokenProbabilities)> {
        self.store.iter().map(|(token, probs)| (token.as_str(), probs))
    }

    /// Number of significant tokens
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

/// Verdict for one message
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// `log_ratio > 0`
    pub is_spam: bool,
    /// Natural-log odds of spam versus ham
    pub log_ratio: f64,
    /// How many of the message's tokens were known to the model
    pub tokens_scored: usize,
}

impl Classification {
    pub fn label(&self) -> &'static str {
        if self.is_spam {
            "Spam"
        } else {
            "Not Spam"
        }
    }
}
