//! Filter service
//!
//! Owns the current model snapshot, the feedback ledger and the test cursor,
//! and drives training and classification against the on-disk corpus.

use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::bayes::{
    classify, tokenize, Classification, FeedbackLedger, LabeledMessage, Model, ModelEstimator, Token,
    TokenProbabilities, TokenSet,
};
use crate::config::Config;
use crate::corpus::Corpus;
use crate::error::{Result, SpamError};
use crate::extract::ExtractedMessage;

/// Model and ledger statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    /// Spam messages the current model was trained on, feedback included
    pub spam_messages: u32,
    /// Ham messages the current model was trained on, feedback included
    pub ham_messages: u32,
    pub spam_prior: f64,
    /// Significant tokens kept after pruning
    pub tokens: usize,
    /// Classified messages waiting to be folded into the next estimation
    pub ledger_entries: usize,
    /// Ledger entries with a spam verdict
    pub ledger_spam: usize,
    /// Ledger entries with a ham verdict
    pub ledger_ham: usize,
    /// Index of the next test message
    pub test_offset: usize,
}

/// Result of classifying one test message
#[derive(Debug, Clone, Serialize)]
pub struct TestReport {
    pub index: usize,
    pub path: PathBuf,
    pub message: ExtractedMessage,
    pub classification: Classification,
}

/// Spam filter service
pub struct FilterService {
    estimator: ModelEstimator,
    corpus: Corpus,
    model: RwLock<Option<Arc<Model>>>,
    ledger: RwLock<FeedbackLedger>,
    test_offset: AtomicUsize,
}

impl FilterService {
    /// Create a service with no model built yet
    pub fn new(config: &Config) -> Self {
        Self {
            estimator: ModelEstimator::new(config.model),
            corpus: Corpus::new(config.corpus.clone()),
            model: RwLock::new(None),
            ledger: RwLock::new(FeedbackLedger::new()),
            test_offset: AtomicUsize::new(0),
        }
    }

    /// Rebuild the model from the training corpus plus every recorded
    /// verdict. On failure the previous model stays installed.
    pub async fn update_tokens(&self) -> Result<ModelSummary> {
        let training = self.corpus.load_training().await?;
        self.train_from(&training.messages).await?;
        let summary = self.summary().await?;

        info!(
            "Tokens updated: {} significant tokens, spam prior {:.4}, ledger {} spam / {} ham",
            summary.tokens, summary.spam_prior, summary.ledger_spam, summary.ledger_ham
        );

        Ok(summary)
    }

    /// Estimate from the given training messages plus the ledger and install
    /// the result
    pub async fn train_from(&self, training: &[LabeledMessage]) -> Result<Arc<Model>> {
        let model = {
            let ledger = self.ledger.read().await;
            debug!(
                "Estimating from {} training messages and {} ledger entries",
                training.len(),
                ledger.len()
            );
            Arc::new(self.estimator.estimate(training, &ledger)?)
        };

        *self.model.write().await = Some(Arc::clone(&model));
        Ok(model)
    }

    /// Current model snapshot
    pub async fn model(&self) -> Result<Arc<Model>> {
        self.model
            .read()
            .await
            .as_ref()
            .map(Arc::clone)
            .ok_or(SpamError::ModelNotBuilt)
    }

    /// Classify text without recording the verdict
    pub async fn classify_text(&self, text: &str) -> Result<Classification> {
        let model = self.model().await?;
        Ok(classify(&model, &tokenize(text)))
    }

    /// Classify text and record its full token set in the ledger
    pub async fn classify_and_record(&self, text: &str) -> Result<Classification> {
        let model = self.model().await?;
        let tokens = tokenize(text);
        let classification = classify(&model, &tokens);
        self.record(tokens, classification.is_spam).await;
        Ok(classification)
    }

    /// Add a verdict to the ledger
    pub async fn record(&self, tokens: TokenSet, is_spam: bool) {
        if self.ledger.write().await.record(tokens, is_spam).is_some() {
            debug!("Ledger entry overwritten by an identical token set");
        }
    }

    /// Classify the next batch of test messages, record every verdict and
    /// advance the cursor by the batch size. Unreadable messages are skipped.
    /// The cursor saturates at `usize::MAX`.
    pub async fn test_mail(&self) -> Result<Vec<TestReport>> {
        let model = self.model().await?;
        let batch = self.corpus.config().test_sample;
        let start = self.test_offset();
        let end = start.saturating_add(batch);

        let mut reports = Vec::with_capacity(end - start);
        for index in start..end {
            let path = self.corpus.test_path(index);
            let message = match self.corpus.load_test(index).await {
                Ok(message) => message,
                Err(e) => {
                    warn!("Skipping test message {}: {}", path.display(), e);
                    continue;
                }
            };

            let tokens = tokenize(&message.text());
            let classification = classify(&model, &tokens);
            debug!(
                index,
                log_ratio = classification.log_ratio,
                is_spam = classification.is_spam,
                "Classified test message"
            );
            self.record(tokens, classification.is_spam).await;

            reports.push(TestReport {
                index,
                path,
                message,
                classification,
            });
        }

        self.test_offset.store(end, Ordering::SeqCst);
        Ok(reports)
    }

    pub fn test_offset(&self) -> usize {
        self.test_offset.load(Ordering::SeqCst)
    }

    /// Move the test cursor. Zero is ignored; returns whether it moved.
    pub fn set_test_offset(&self, index: usize) -> bool {
        if index == 0 {
            return false;
        }
        self.test_offset.store(index, Ordering::SeqCst);
        true
    }

    /// Copy of the ledger
    pub async fn ledger(&self) -> FeedbackLedger {
        self.ledger.read().await.clone()
    }

    /// Significant tokens of the current snapshot, sorted by token
    pub async fn tokens(&self) -> Result<Vec<(Token, TokenProbabilities)>> {
        let model = self.model().await?;
        Ok(model
            .tokens()
            .map(|(token, probs)| (token.to_string(), *probs))
            .collect())
    }

    pub async fn summary(&self) -> Result<ModelSummary> {
        let model = self.model().await?;
        let (ledger_entries, (ledger_spam, ledger_ham)) = {
            let ledger = self.ledger.read().await;
            (ledger.len(), ledger.verdict_counts())
        };

        Ok(ModelSummary {
            spam_messages: model.spam_count(),
            ham_messages: model.ham_count(),
            spam_prior: model.spam_prior(),
            tokens: model.len(),
            ledger_entries,
            ledger_spam,
            ledger_ham,
            test_offset: self.test_offset(),
        })
    }
}
