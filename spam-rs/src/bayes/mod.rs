//! Naive Bayes spam model
//!
//! Tokenization, estimation with smoothing and pruning, log-likelihood-ratio
//! classification, and the feedback ledger used for retraining. Nothing here
//! performs I/O.

pub mod classifier;
pub mod estimator;
pub mod ledger;
pub mod tokenizer;
pub mod types;

pub use classifier::classify;
pub use estimator::{CountStore, ModelEstimator};
pub use ledger::FeedbackLedger;
pub use tokenizer::{message_text, tokenize};
pub use types::*;
