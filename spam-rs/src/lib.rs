//! spam-rs: Naive Bayes spam filter
//!
//! Classifies mail as spam or ham from per-token conditional probabilities
//! estimated on a labeled corpus, and folds every verdict back into the
//! training data on the next estimation pass.
//!
//! # Example
//!
//! ```
//! use spam_rs::bayes::{classify, tokenize, FeedbackLedger, LabeledMessage, ModelEstimator};
//!
//! let training = vec![
//!     LabeledMessage::spam(tokenize("Free money")),
//!     LabeledMessage::ham(tokenize("Meeting agenda")),
//! ];
//! let mut ledger = FeedbackLedger::new();
//!
//! let estimator = ModelEstimator::default();
//! let model = estimator.estimate(&training, &ledger).unwrap();
//!
//! let tokens = tokenize("FREE offer!");
//! let verdict = classify(&model, &tokens);
//! assert!(verdict.is_spam);
//!
//! // The verdict becomes training data for the next pass
//! ledger.record(tokens, verdict.is_spam);
//! let model = estimator.estimate(&training, &ledger).unwrap();
//! assert_eq!(model.spam_count(), 2);
//! ```
//!
//! # Modules
//!
//! - [`bayes`]: tokenizer, estimator, classifier and feedback ledger
//! - [`config`]: Configuration management
//! - [`corpus`]: Label manifest and message files on disk
//! - [`error`]: Error types and handling
//! - [`extract`]: Subject and body text from raw mail
//! - [`service`]: Model snapshots, feedback and test batches
//! - [`shell`]: Interactive menu

pub mod bayes;
pub mod config;
pub mod corpus;
pub mod error;
pub mod extract;
pub mod service;
pub mod shell;

// Re-export commonly used types
pub use crate::config::Config;
pub use crate::error::{Result, SpamError};
pub use crate::service::FilterService;
