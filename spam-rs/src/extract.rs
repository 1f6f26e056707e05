//! Plain-text extraction from raw RFC 5322 messages

use mail_parser::MessageParser;
use serde::{Deserialize, Serialize};

use crate::bayes::message_text;
use crate::error::{Result, SpamError};

/// The parts of a mail the filter looks at
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedMessage {
    pub subject: String,
    /// First sender address, empty when absent
    pub from: String,
    /// Text bodies joined by newlines; HTML-only parts converted to text
    pub body: String,
}

impl ExtractedMessage {
    /// Subject line followed by the body
    pub fn text(&self) -> String {
        message_text(&self.subject, &self.body)
    }
}

/// Parse a raw message and pull out subject, sender and body text
pub fn extract(raw: &[u8]) -> Result<ExtractedMessage> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Err(SpamError::Parse("empty message".to_string()));
    }

    let parsed = MessageParser::default()
        .parse(raw)
        .ok_or_else(|| SpamError::Parse("not a parseable mail message".to_string()))?;

    let subject = parsed.subject().unwrap_or("").to_string();

    let from = parsed
        .from()
        .and_then(|f| f.first())
        .map(|a| a.address().map(|s| s.to_string()).unwrap_or_default())
        .unwrap_or_default();

    let mut bodies = Vec::new();
    let mut pos = 0;
    while let Some(text) = parsed.body_text(pos) {
        bodies.push(text.trim_end().to_string());
        pos += 1;
    }

    Ok(ExtractedMessage {
        subject,
        from,
        body: bodies.join("\n"),
    })
}
