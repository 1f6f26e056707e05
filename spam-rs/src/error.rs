use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpamError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed manifest line {line}: {reason}")]
    Manifest { line: usize, reason: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Cannot estimate a model from an empty training set")]
    EmptyTrainingSet,

    #[error("No model has been built yet")]
    ModelNotBuilt,
}

impl From<::config::ConfigError> for SpamError {
    fn from(e: ::config::ConfigError) -> Self {
        SpamError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SpamError>;
