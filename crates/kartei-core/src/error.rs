use thiserror::Error;

/// Errors from configuration and process setup; the codec has its own.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Logging setup failed: {0}")]
    LoggingError(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
