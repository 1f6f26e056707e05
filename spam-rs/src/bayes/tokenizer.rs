//! Message tokenization

use regex::Regex;
use std::sync::OnceLock;

use super::types::TokenSet;

/// Runs of ASCII punctuation and whitespace
const DELIMITER_PATTERN: &str = r"[[:punct:][:space:]]+";

fn delimiters() -> &'static Regex {
    static DELIMITERS: OnceLock<Regex> = OnceLock::new();
    DELIMITERS.get_or_init(|| Regex::new(DELIMITER_PATTERN).expect("delimiter pattern is valid"))
}

/// Split text into its set of distinct lower-cased tokens.
///
/// No stemming, stop-word removal or length filter is applied. Empty pieces
/// (leading or trailing delimiters) are dropped.
pub fn tokenize(text: &str) -> TokenSet {
    let lowered = text.to_lowercase();
    delimiters()
        .split(&lowered)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Text a mail is scored on: the subject line followed by the body
pub fn message_text(subject: &str, body: &str) -> String {
    format!("{}\n{}", subject, body)
}
