/*!
Common error types for the reciprocal counter core.
*/

use thiserror::Error;

/// Common result type used throughout the core library
pub type Result<T> = std::result::Result<T, CounterError>;

/// Errors raised while interpreting counter state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CounterError {
    /// Mode field holds a bit pattern with no measurement mode
    #[error("Invalid mode bits: {0:#04x}")]
    InvalidMode(u8),

    /// Input field holds a bit pattern with no input range
    #[error("Invalid input range bits: {0:#04x}")]
    InvalidInput(u8),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CounterError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
