use crate::error::{Result, SpamError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix for environment variable overrides, e.g. `SPAM_MODEL__SIG_THRESHOLD`
pub const ENV_PREFIX: &str = "SPAM";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Estimation parameters
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ModelConfig {
    /// Tokens whose class probabilities differ by less than this are pruned
    #[serde(default = "default_sig_threshold")]
    pub sig_threshold: f64,
    /// Pseudocount added to each token's per-class count
    #[serde(default = "default_token_pseudocount")]
    pub token_pseudocount: f64,
    /// Pseudocount added to each class's message count
    #[serde(default = "default_class_pseudocount")]
    pub class_pseudocount: f64,
}

/// Where the labeled training set and the test messages live
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorpusConfig {
    /// Manifest of `<label> <file name>` lines
    #[serde(default = "default_labels_path")]
    pub labels_path: PathBuf,
    #[serde(default = "default_training_dir")]
    pub training_dir: PathBuf,
    #[serde(default = "default_testing_dir")]
    pub testing_dir: PathBuf,
    /// Test files are named `<test_prefix><index:05>.eml`
    #[serde(default = "default_test_prefix")]
    pub test_prefix: String,
    /// Number of manifest entries to train on (0 = all)
    #[serde(default = "default_train_sample")]
    pub train_sample: usize,
    /// Number of test messages classified per batch
    #[serde(default = "default_test_sample")]
    pub test_sample: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// One of `pretty`, `compact`, `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_sig_threshold() -> f64 {
    0.0001
}

fn default_token_pseudocount() -> f64 {
    1.0
}

fn default_class_pseudocount() -> f64 {
    2.0
}

fn default_labels_path() -> PathBuf {
    PathBuf::from("SPAMTrain.label")
}

fn default_training_dir() -> PathBuf {
    PathBuf::from("TRAINING")
}

fn default_testing_dir() -> PathBuf {
    PathBuf::from("TESTING")
}

fn default_test_prefix() -> String {
    "TEST_".to_string()
}

fn default_train_sample() -> usize {
    2000
}

fn default_test_sample() -> usize {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            sig_threshold: default_sig_threshold(),
            token_pseudocount: default_token_pseudocount(),
            class_pseudocount: default_class_pseudocount(),
        }
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            labels_path: default_labels_path(),
            training_dir: default_training_dir(),
            testing_dir: default_testing_dir(),
            test_prefix: default_test_prefix(),
            train_sample: default_train_sample(),
            test_sample: default_test_sample(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ModelConfig {
    /// Reject parameters that would let a smoothed probability leave (0, 1)
    pub fn validate(&self) -> Result<()> {
        if !self.sig_threshold.is_finite() || self.sig_threshold < 0.0 {
            return Err(SpamError::Config(format!(
                "sig_threshold must be a finite, non-negative number (got {})",
                self.sig_threshold
            )));
        }
        if !self.token_pseudocount.is_finite() || self.token_pseudocount <= 0.0 {
            return Err(SpamError::Config(format!(
                "token_pseudocount must be positive (got {})",
                self.token_pseudocount
            )));
        }
        if !self.class_pseudocount.is_finite() || self.class_pseudocount <= self.token_pseudocount {
            return Err(SpamError::Config(format!(
                "class_pseudocount must exceed token_pseudocount (got {} <= {})",
                self.class_pseudocount, self.token_pseudocount
            )));
        }
        Ok(())
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SpamError::Config(e.to_string()))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| SpamError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Layer defaults, an optional TOML file and `SPAM_*` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder =
            ::config::Config::builder().add_source(::config::Config::try_from(&Config::default())?);

        if let Some(path) = path {
            builder = builder.add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Toml)
                    .required(true),
            );
        }

        let config: Config = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.model.validate()?;
        if self.corpus.test_sample == 0 {
            return Err(SpamError::Config(
                "corpus.test_sample must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_reference_constants() {
        let config = Config::default();
        assert_eq!(config.model.sig_threshold, 0.0001);
        assert_eq!(config.model.token_pseudocount, 1.0);
        assert_eq!(config.model.class_pseudocount, 2.0);
        assert_eq!(config.corpus.train_sample, 2000);
        assert_eq!(config.corpus.test_sample, 5);
        assert_eq!(config.corpus.labels_path, PathBuf::from("SPAMTrain.label"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_partial_sections() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[model]\nsig_threshold = 0.05\n\n[corpus]\ntest_sample = 10").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.model.sig_threshold, 0.05);
        assert_eq!(config.model.class_pseudocount, 2.0);
        assert_eq!(config.corpus.test_sample, 10);
        assert_eq!(config.corpus.test_prefix, "TEST_");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_from_file_rejects_bad_smoothing() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[model]\ntoken_pseudocount = 2.0\nclass_pseudocount = 1.0").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, SpamError::Config(_)));
    }

    #[test]
    fn test_from_file_missing() {
        let err = Config::from_file("/nonexistent/spam-rs.toml").unwrap_err();
        assert!(matches!(err, SpamError::Config(_)));
    }

    #[test]
    fn test_load_layers_file_over_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nformat = \"json\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.model.sig_threshold, 0.0001);
    }

    #[test]
    fn test_load_env_overrides_file_and_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[corpus]\ntest_sample = 3\ntest_prefix = \"MAIL_\"").unwrap();

        std::env::set_var("SPAM_CORPUS__TEST_SAMPLE", "9");
        let loaded = Config::load(Some(file.path()));
        std::env::remove_var("SPAM_CORPUS__TEST_SAMPLE");

        let config = loaded.unwrap();
        assert_eq!(config.corpus.test_sample, 9);
        assert_eq!(config.corpus.test_prefix, "MAIL_");
        assert_eq!(config.corpus.train_sample, 2000);
    }

    #[test]
    fn test_validate_rejects_negative_threshold() {
        let model = ModelConfig {
            sig_threshold: -1.0,
            ..ModelConfig::default()
        };
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_test_sample() {
        let mut config = Config::default();
        config.corpus.test_sample = 0;
        assert!(config.validate().is_err());
    }
}
