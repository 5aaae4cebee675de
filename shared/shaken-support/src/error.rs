//! Generic error taxonomy for STIR/SHAKEN services
//!
//! This is the ambient, service-shell error type (config/network/plumbing
//! failures). Domain-specific SIP status mapping (403/428/436/437/438) lives
//! in `shaken-core::error` next to the PASSporT and verification logic.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShakenSupportError>;

#[derive(Error, Debug)]
pub enum ShakenSupportError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Timeout: {0}")]
    Timeout(String),
}

impl ShakenSupportError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Unavailable(_) => 503,
            Self::Timeout(_) => 504,
            _ => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Network(_) => "NETWORK_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unavailable(_) => "UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Timeout(_) => "TIMEOUT",
        }
    }
}

impl From<std::io::Error> for ShakenSupportError {
    fn from(err: std::io::Error) -> Self {
        ShakenSupportError::Network(err.to_string())
    }
}
