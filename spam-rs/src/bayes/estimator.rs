//! Model estimation
//!
//! Accumulates per-class token presence counts from labeled messages, turns
//! them into smoothed conditional probabilities and prunes tokens that do
//! not separate the classes.

use std::collections::BTreeMap;
use tracing::debug;

use super::ledger::FeedbackLedger;
use super::types::{LabeledMessage, Model, Token, TokenCounts, TokenProbabilities};
use crate::config::ModelConfig;
use crate::error::{Result, SpamError};

/// Token presence counts gathered during one estimation pass
#[derive(Debug, Clone, Default)]
pub struct CountStore {
    tokens: BTreeMap<Token, TokenCounts>,
    spam_messages: u32,
    ham_messages: u32,
}

impl CountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one message of the given class
    pub fn observe<'a, I>(&mut self, tokens: I, is_spam: bool)
    where
        I: IntoIterator<Item = &'a Token>,
    {
        if is_spam {
            self.spam_messages += 1;
        } else {
            self.ham_messages += 1;
        }

        for token in tokens {
            match self.tokens.get_mut(token) {
                Some(counts) => counts.increment(is_spam),
                None => {
                    self.tokens.insert(token.clone(), TokenCounts::first(is_spam));
                }
            }
        }
    }

    pub fn spam_messages(&self) -> u32 {
        self.spam_messages
    }

    pub fn ham_messages(&self) -> u32 {
        self.ham_messages
    }

    /// Number of distinct tokens seen
    pub fn vocabulary(&self) -> usize {
        self.tokens.len()
    }
}

/// Builds models from training data and the feedback ledger
#[derive(Debug, Clone, Copy)]
pub struct ModelEstimator {
    config: ModelConfig,
}

impl ModelEstimator {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    /// Estimate a fresh model from the training set followed by every
    /// ledger entry
    pub fn estimate(&self, training: &[LabeledMessage], ledger: &FeedbackLedger) -> Result<Model> {
        let mut counts = CountStore::new();

        for message in training {
            counts.observe(&message.tokens, message.is_spam);
        }
        for (tokens, is_spam) in ledger.entries() {
            counts.observe(tokens, is_spam);
        }

        self.finish(counts)
    }

    /// Smooth and prune accumulated counts into a model
    pub fn finish(&self, counts: CountStore) -> Result<Model> {
        let (spam_messages, ham_messages) = (counts.spam_messages(), counts.ham_messages());
        if spam_messages == 0 && ham_messages == 0 {
            return Err(SpamError::EmptyTrainingSet);
        }

        let vocabulary = counts.vocabulary();
        let spam_total = spam_messages as f64 + self.config.class_pseudocount;
        let ham_total = ham_messages as f64 + self.config.class_pseudocount;

        let store: BTreeMap<Token, TokenProbabilities> = counts
            .tokens
            .into_iter()
            .map(|(token, c)| {
                let probs = TokenProbabilities {
                    spam: (c.spam as f64 + self.config.token_pseudocount) / spam_total,
                    ham: (c.ham as f64 + self.config.token_pseudocount) / ham_total,
                };
                (token, probs)
            })
            .filter(|(_, probs)| probs.separation() >= self.config.sig_threshold)
            .collect();

        let model = Model::new(store, spam_messages, ham_messages);

        debug!(
            spam = model.spam_count(),
            ham = model.ham_count(),
            vocabulary,
            kept = model.len(),
            pruned = vocabulary - model.len(),
            spam_prior = model.spam_prior(),
            "Model estimated"
        );

        Ok(model)
    }
}

impl Default for ModelEstimator {
    fn default() -> Self {
        Self::new(ModelConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bayes::types::TokenSet;

    fn set(words: &[&str]) -> TokenSet {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn training() -> Vec<LabeledMessage> {
        vec![
            LabeledMessage::spam(set(&["free", "money"])),
            LabeledMessage::ham(set(&["meeting", "agenda"])),
        ]
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_count_store_presence_counts() {
        let mut counts = CountStore::new();
        counts.observe(&set(&["free", "money"]), true);
        counts.observe(&set(&["free", "lunch"]), false);
        counts.observe(&set(&["free"]), true);

        assert_eq!(counts.spam_messages(), 2);
        assert_eq!(counts.ham_messages(), 1);
        assert_eq!(counts.tokens.get("free"), Some(&TokenCounts { spam: 2, ham: 1 }));
        assert_eq!(counts.tokens.get("lunch"), Some(&TokenCounts { spam: 0, ham: 1 }));
        assert_eq!(counts.tokens.get("nope"), None);
        assert_eq!(counts.vocabulary(), 3);
    }

    #[test]
    fn test_two_message_scenario() {
        let model = ModelEstimator::default()
            .estimate(&training(), &FeedbackLedger::new())
            .unwrap();

        assert_eq!(model.spam_count(), 1);
        assert_eq!(model.ham_count(), 1);
        assert_eq!(model.spam_prior(), 0.5);

        let free = model.get("free").unwrap();
        assert!(approx(free.spam, 2.0 / 3.0));
        assert!(approx(free.ham, 1.0 / 3.0));

        let agenda = model.get("agenda").unwrap();
        assert!(approx(agenda.spam, 1.0 / 3.0));
        assert!(approx(agenda.ham, 2.0 / 3.0));
        assert_eq!(model.len(), 4);
    }

    #[test]
    fn test_empty_training_set_fails() {
        let err = ModelEstimator::default()
            .estimate(&[], &FeedbackLedger::new())
            .unwrap_err();
        assert!(matches!(err, SpamError::EmptyTrainingSet));
    }

    #[test]
    fn test_ledger_alone_is_enough() {
        let mut ledger = FeedbackLedger::new();
        ledger.record(set(&["hello"]), false);

        let model = ModelEstimator::default().estimate(&[], &ledger).unwrap();
        assert_eq!(model.ham_count(), 1);
        assert_eq!(model.spam_prior(), 0.0);
    }

    #[test]
    fn test_uninformative_tokens_pruned() {
        // "the" appears in every message of both classes
        let training = vec![
            LabeledMessage::spam(set(&["the", "free"])),
            LabeledMessage::ham(set(&["the", "meeting"])),
        ];
        let model = ModelEstimator::default()
            .estimate(&training, &FeedbackLedger::new())
            .unwrap();

        assert!(!model.contains("the"));
        assert!(model.contains("free"));
        assert!(model.contains("meeting"));
    }

    #[test]
    fn test_pruning_respects_unbalanced_classes() {
        // Same raw count in both classes, different rates: kept
        let training = vec![
            LabeledMessage::spam(set(&["offer"])),
            LabeledMessage::ham(set(&["offer"])),
            LabeledMessage::ham(set(&["notes"])),
        ];
        let model = ModelEstimator::default()
            .estimate(&training, &FeedbackLedger::new())
            .unwrap();

        let offer = model.get("offer").unwrap();
        assert!(approx(offer.spam, 2.0 / 3.0));
        assert!(approx(offer.ham, 2.0 / 4.0));
    }

    #[test]
    fn test_custom_threshold_prunes_more() {
        let config = ModelConfig {
            sig_threshold: 0.5,
            ..ModelConfig::default()
        };
        let model = ModelEstimator::new(config)
            .estimate(&training(), &FeedbackLedger::new())
            .unwrap();

        assert!(model.is_empty());
        assert_eq!(model.spam_prior(), 0.5);
    }

    #[test]
    fn test_custom_pseudocounts() {
        let config = ModelConfig {
            token_pseudocount: 0.5,
            class_pseudocount: 1.0,
            ..ModelConfig::default()
        };
        let model = ModelEstimator::new(config)
            .estimate(&training(), &FeedbackLedger::new())
            .unwrap();

        let free = model.get("free").unwrap();
        assert!(approx(free.spam, 1.5 / 2.0));
        assert!(approx(free.ham, 0.5 / 2.0));
    }

    #[test]
    fn test_smoothing_bounds_and_pruning_invariant() {
        let training = vec![
            LabeledMessage::spam(set(&["win", "cash", "now", "the"])),
            LabeledMessage::spam(set(&["cash", "prize", "the"])),
            LabeledMessage::spam(set(&["win", "free", "click"])),
            LabeledMessage::ham(set(&["lunch", "at", "noon", "the"])),
            LabeledMessage::ham(set(&["report", "due", "the", "now"])),
        ];
        let config = ModelConfig::default();
        let model = ModelEstimator::new(config)
            .estimate(&training, &FeedbackLedger::new())
            .unwrap();

        assert!(!model.is_empty());
        for (token, probs) in model.tokens() {
            assert!(probs.spam > 0.0 && probs.spam < 1.0, "{token}: {probs:?}");
            assert!(probs.ham > 0.0 && probs.ham < 1.0, "{token}: {probs:?}");
            assert!(probs.separation() >= config.sig_threshold, "{token}: {probs:?}");
        }
        assert_eq!(model.spam_prior(), 3.0 / 5.0);
    }

    #[test]
    fn test_deterministic() {
        let mut ledger = FeedbackLedger::new();
        ledger.record(set(&["money", "now"]), true);
        ledger.record(set(&["agenda", "notes"]), false);

        let estimator = ModelEstimator::default();
        let a = estimator.estimate(&training(), &ledger).unwrap();
        let b = estimator.estimate(&training(), &ledger).unwrap();

        assert_eq!(a, b);
        let a_tokens: Vec<_> = a.tokens().map(|(t, p)| (t.to_string(), p.spam.to_bits(), p.ham.to_bits())).collect();
        let b_tokens: Vec<_> = b.tokens().map(|(t, p)| (t.to_string(), p.spam.to_bits(), p.ham.to_bits())).collect();
        assert_eq!(a_tokens, b_tokens);
    }

    #[test]
    fn test_feedback_closure() {
        let feedback = set(&["free", "prize"]);

        let mut ledger = FeedbackLedger::new();
        ledger.record(feedback.clone(), true);
        let via_ledger = ModelEstimator::default().estimate(&training(), &ledger).unwrap();

        let mut extended = training();
        extended.push(LabeledMessage::spam(feedback));
        let via_training = ModelEstimator::default()
            .estimate(&extended, &FeedbackLedger::new())
            .unwrap();

        assert_eq!(via_ledger, via_training);
        assert_eq!(via_ledger.spam_count(), 2);
    }
}
