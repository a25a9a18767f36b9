//! Error handling for the donor dashboard sync service
//!
//! Transport and write failures are caught at the fetcher/reconciler
//! boundaries and converted to result values; parsing and mapping degrade
//! via defaults and never produce an error.

use thiserror::Error;

use crate::fetcher::FeedKind;

/// Donor sync service error type
#[derive(Error, Debug, Clone)]
pub enum DonorSrvError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Feed transport errors (non-success response or network failure)
    #[error("Transport error: {feed} feed: {detail}")]
    TransportError {
        feed: FeedKind,
        status: Option<u16>,
        detail: String,
    },

    /// Write channel errors (status or inventory write rejected)
    #[error("Write error: {0}")]
    WriteError(String),

    /// Data handling errors (serialization, conversion)
    #[error("Data error: {0}")]
    DataError(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type alias for the donor sync service
pub type Result<T> = std::result::Result<T, DonorSrvError>;

impl DonorSrvError {
    pub fn config(msg: impl Into<String>) -> Self {
        DonorSrvError::ConfigError(msg.into())
    }

    pub fn transport(feed: FeedKind, status: Option<u16>, detail: impl Into<String>) -> Self {
        DonorSrvError::TransportError {
            feed,
            status,
            detail: detail.into(),
        }
    }

    pub fn write(msg: impl Into<String>) -> Self {
        DonorSrvError::WriteError(msg.into())
    }

    pub fn data(msg: impl Into<String>) -> Self {
        DonorSrvError::DataError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        DonorSrvError::InternalError(msg.into())
    }

    /// HTTP status reported by the transport, when one was received
    pub fn http_status(&self) -> Option<u16> {
        match self {
            DonorSrvError::TransportError { status, .. } => *status,
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for external error types
// ============================================================================

impl From<std::io::Error> for DonorSrvError {
    fn from(err: std::io::Error) -> Self {
        DonorSrvError::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for DonorSrvError {
    fn from(err: serde_json::Error) -> Self {
        DonorSrvError::DataError(format!("JSON: {err}"))
    }
}

impl From<figment::Error> for DonorSrvError {
    fn from(err: figment::Error) -> Self {
        DonorSrvError::ConfigError(err.to_string())
    }
}
