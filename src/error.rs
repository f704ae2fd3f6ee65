//! Typed error categories. Everything else travels as `anyhow::Error`;
//! callers that care can `downcast_ref::<RcError>()`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RcError {
    /// Bad parameters, rejected before any I/O happens.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A CSV file that does not follow the record layout.
    #[error("malformed file {path}: {reason}")]
    MalformedFile { path: String, reason: String },
}

impl RcError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        RcError::InvalidArgument(msg.into())
    }
}
