//! Labeled training corpus and numbered test messages on disk
//!
//! The manifest lists one training message per line as `<label> <file name>`,
//! where label `0`/`spam` marks spam and `1`/`ham` marks ham. Any other label,
//! including other integers such as `2`, is treated as a malformed line and
//! skipped rather than read as ham. Test messages are addressed by index as
//! `<testing_dir>/<test_prefix><index:05>.eml`.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::bayes::{tokenize, LabeledMessage};
use crate::config::CorpusConfig;
use crate::error::{Result, SpamError};
use crate::extract::{extract, ExtractedMessage};

/// One manifest line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub is_spam: bool,
    pub file_name: String,
}

/// Parse a class label; `None` if unrecognised
pub fn parse_label(label: &str) -> Option<bool> {
    match label.to_ascii_lowercase().as_str() {
        "0" | "spam" => Some(true),
        "1" | "ham" => Some(false),
        _ => None,
    }
}

impl ManifestEntry {
    /// Parse a manifest line. Blank lines yield `Ok(None)`.
    pub fn parse(line_no: usize, line: &str) -> Result<Option<Self>> {
        let mut fields = line.split_whitespace();

        let label = match fields.next() {
            Some(label) => label,
            None => return Ok(None),
        };

        let is_spam = parse_label(label).ok_or_else(|| SpamError::Manifest {
            line: line_no,
            reason: format!("unknown label '{}'", label),
        })?;

        let file_name = fields.next().ok_or_else(|| SpamError::Manifest {
            line: line_no,
            reason: "missing file name".to_string(),
        })?;

        Ok(Some(Self {
            is_spam,
            file_name: file_name.to_string(),
        }))
    }
}

/// Parsed manifest; malformed lines are counted and left out
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
    skipped: usize,
}

impl Manifest {
    pub fn parse(content: &str) -> Self {
        let mut manifest = Manifest::default();

        for (idx, line) in content.lines().enumerate() {
            match ManifestEntry::parse(idx + 1, line) {
                Ok(Some(entry)) => manifest.entries.push(entry),
                Ok(None) => {}
                Err(e) => {
                    warn!("Skipping manifest entry: {}", e);
                    manifest.skipped += 1;
                }
            }
        }

        manifest
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Ok(Self::parse(&content))
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Number of malformed lines
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Training messages loaded from the manifest
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    pub messages: Vec<LabeledMessage>,
    /// Manifest lines or message files that could not be used
    pub skipped: usize,
}

/// Read access to the on-disk corpus
#[derive(Debug, Clone)]
pub struct Corpus {
    config: CorpusConfig,
}

impl Corpus {
    pub fn new(config: CorpusConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CorpusConfig {
        &self.config
    }

    pub fn training_path(&self, entry: &ManifestEntry) -> PathBuf {
        self.config.training_dir.join(&entry.file_name)
    }

    pub fn test_path(&self, index: usize) -> PathBuf {
        self.config
            .testing_dir
            .join(format!("{}{:05}.eml", self.config.test_prefix, index))
    }

    /// Read and extract one message file
    pub async fn read_message(path: &Path) -> Result<ExtractedMessage> {
        let raw = fs::read(path).await?;
        extract(&raw)
    }

    /// Read and extract the test message at `index`
    pub async fn load_test(&self, index: usize) -> Result<ExtractedMessage> {
        Self::read_message(&self.test_path(index)).await
    }

    /// Load the first `train_sample` manifest entries (all if 0), in manifest
    /// order. Unreadable messages are skipped with a warning; a missing
    /// manifest is an error.
    pub async fn load_training(&self) -> Result<TrainingSet> {
        let manifest = Manifest::load(&self.config.labels_path).await?;

        let limit = match self.config.train_sample {
            0 => manifest.len(),
            n => n.min(manifest.len()),
        };

        let mut set = TrainingSet {
            messages: Vec::with_capacity(limit),
            skipped: manifest.skipped(),
        };

        for entry in &manifest.entries()[..limit] {
            let path = self.training_path(entry);
            match Self::read_message(&path).await {
                Ok(message) => {
                    set.messages
                        .push(LabeledMessage::new(tokenize(&message.text()), entry.is_spam));
                }
                Err(e) => {
                    warn!("Skipping training message {}: {}", path.display(), e);
                    set.skipped += 1;
                }
            }
        }

        if self.config.train_sample > manifest.len() {
            debug!(
                "Manifest has {} entries, fewer than train_sample {}",
                manifest.len(),
                self.config.train_sample
            );
        }

        info!(
            "Loaded {} training messages ({} skipped)",
            set.messages.len(),
            set.skipped
        );

        Ok(set)
    }
}
