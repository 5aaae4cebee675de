//! REST request/response DTOs (ambient, §6 "Service HTTP surface").
//!
//! These carry call parameters and verification outcomes across the wire;
//! they are not part of the PASSporT claim model itself (that lives in
//! `shaken_core::passport`) — this module only shapes what `/v1/sign` and
//! `/v1/verify` accept and return.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct SignCallRequest {
    pub orig_tn: String,
    pub dest_tn: String,
    /// Attestation level "A", "B", or "C". Omitted ⇒ no `attest` claim.
    #[serde(default)]
    pub attest: Option<String>,
    #[serde(default)]
    pub orig_id: Option<String>,
    /// Overrides the service's default signing certificate by id.
    #[serde(default)]
    pub certificate_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignCallResponse {
    pub identity_header: String,
    pub certificate_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyCallRequest {
    pub identity_header: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct VerifyCallResponse {
    pub sip_status: u16,
    pub attest: Option<String>,
    pub orig_tn: Option<String>,
    pub dest_tn: Option<String>,
    pub origid: Option<String>,
    pub x5u: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadCertificateRequest {
    pub name: String,
    pub certificate_pem: String,
    pub private_key_pem: String,
    pub x5u: String,
    #[serde(default)]
    pub set_as_default: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CertificateSummary {
    pub id: String,
    pub name: String,
    pub x5u: String,
    pub is_default: bool,
}
