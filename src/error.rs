use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AstmError>;

#[derive(Error, Debug)]
pub enum AstmError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("framing error: {0}")]
    Framing(String),

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    Checksum { expected: String, actual: String },

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("timeout waiting for data")]
    Timeout,

    #[error("consumer delivery failed: {0}")]
    ConsumerDelivery(String),
}
