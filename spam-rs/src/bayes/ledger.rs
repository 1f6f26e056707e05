//! Feedback ledger of previously classified messages

use std::collections::BTreeMap;

use super::types::TokenSet;

/// Verdicts of every message classified so far, keyed by the message's full
/// token set. Fed back into the next estimation pass as training data.
///
/// Entries are never removed. Recording an identical token set again
/// replaces the earlier verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackLedger {
    entries: BTreeMap<TokenSet, bool>,
}

impl FeedbackLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a verdict, returning the one it replaced if the same token set
    /// had been recorded before
    pub fn record(&mut self, tokens: TokenSet, is_spam: bool) -> Option<bool> {
        self.entries.insert(tokens, is_spam)
    }

    /// All `(tokens, verdict)` pairs, ordered by token set
    pub fn entries(&self) -> impl Iterator<Item = (&TokenSet, bool)> {
        self.entries.iter().map(|(tokens, &is_spam)| (tokens, is_spam))
    }

    pub fn verdict(&self, tokens: &TokenSet) -> Option<bool> {
        self.entries.get(tokens).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (spam, ham) verdict totals
    pub fn verdict_counts(&self) -> (usize, usize) {
        let spam = self.entries.values().filter(|&&v| v).count();
        (spam, self.entries.len() - spam)
    }
}
