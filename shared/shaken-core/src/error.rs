//! Error taxonomy for the STIR/SHAKEN core.
//!
//! Mirrors the SIP status-code mapping in RFC 8224 §6.2: every failure an
//! authentication or verification operation can produce carries both a
//! machine-matchable kind and the SIP status it maps to, so a caller sitting
//! on top of real SIP transaction plumbing can emit the right response
//! without re-deriving the mapping.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShakenError>;

#[derive(Error, Debug)]
pub enum ShakenError {
    /// Programmer/caller mistake: null/empty required input, bad path, etc.
    #[error("invalid parameters: {0}")]
    GeneralError(String),

    /// Underlying crypto primitive failure (RNG, curve init, malformed key).
    #[error("crypto error: {0}")]
    CryptoError(String),

    /// `iat` outside the configured freshness window. SIP 403.
    #[error("stale date: {0}")]
    StaleDate(String),

    /// No Identity header present where one is required. SIP 428.
    /// Emitted by policy layers above this crate, never detected here.
    #[error("use identity header")]
    UseIdentityHeader,

    /// Referenced certificate could not be fetched. SIP 436.
    #[error("bad identity info: {0}")]
    BadIdentityInfo(String),

    /// Certificate malformed, untrusted, revoked, expired, or wrong EKU. SIP 437.
    #[error("unsupported credential: {0}")]
    UnsupportedCredential(String),

    /// Identity header grammar, missing parameter, or missing claim. SIP 438.
    #[error("invalid identity header: {0}")]
    InvalidIdentityHeader(String),

    /// Signature verification failed against the resolved public key. SIP 438.
    #[error("invalid identity header signature")]
    InvalidIdentityHeaderSignature,
}

impl ShakenError {
    /// SIP status code this error kind maps to, per RFC 8224 §6.2.
    pub fn sip_status(&self) -> u16 {
        match self {
            Self::GeneralError(_) | Self::CryptoError(_) => 500,
            Self::StaleDate(_) => 403,
            Self::UseIdentityHeader => 428,
            Self::BadIdentityInfo(_) => 436,
            Self::UnsupportedCredential(_) => 437,
            Self::InvalidIdentityHeader(_) | Self::InvalidIdentityHeaderSignature => 438,
        }
    }

    /// Short machine-matchable tag, stable across message-text changes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GeneralError(_) => "GENERAL_ERROR",
            Self::CryptoError(_) => "CRYPTO_ERROR",
            Self::StaleDate(_) => "STALE_DATE",
            Self::UseIdentityHeader => "USE_IDENTITY_HEADER",
            Self::BadIdentityInfo(_) => "BAD_IDENTITY_INFO",
            Self::UnsupportedCredential(_) => "UNSUPPORTED_CREDENTIAL",
            Self::InvalidIdentityHeader(_) => "INVALID_IDENTITY_HEADER",
            Self::InvalidIdentityHeaderSignature => "INVALID_IDENTITY_HEADER_SIGNATURE",
        }
    }
}
