//! Log-likelihood-ratio classification

use super::types::{Classification, Model, TokenSet};

/// Score a message's tokens against a model.
///
/// Tokens the model does not know are skipped. The verdict is spam only when
/// the log ratio is strictly positive, so a tie is ham. Neither the model nor
/// any ledger is touched; recording the verdict is up to the caller.
pub fn classify(model: &Model, tokens: &TokenSet) -> Classification {
    let mut log_ratio = model.prior_log_odds();
    let mut tokens_scored = 0;

    for probs in tokens.iter().filter_map(|token| model.get(token)) {
        log_ratio += probs.log_ratio();
        tokens_scored += 1;
    }

    Classification {
        is_spam: log_ratio > 0.0,
        log_ratio,
        tokens_scored,
    }
}
