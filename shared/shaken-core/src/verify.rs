//! Verification Service (C6): parse the Identity header (C4), fetch the
//! referenced certificate through an injected capability, validate the chain
//! (C2), verify the signature (C1+C3), and enforce claim policy — mapping
//! every failure onto the 403/428/436/437/438 taxonomy.
//!
//! State machine (per verification): `Init -> ParseHeader -> FetchCert ->
//! ValidateChain -> VerifySig -> CheckClaims -> Done`. Any state can jump
//! straight to `Done(error)`; there are no retries here — retry policy
//! belongs to the caller (RFC 8224 §6.2.4).

use std::time::Duration;

use crate::crypto;
use crate::error::{Result, ShakenError};
use crate::identity_header::{self, IdentityHeader};
use crate::passport::{self, PassportClaims, VerifyPolicy};
use crate::x509::{self, ChainPolicy};

/// The only I/O this module performs: resolving a cert URL to bytes. The
/// core never opens a socket itself — callers inject a transport, which
/// keeps this crate testable offline and lets callers swap HTTP for
/// anything else the deployment needs (§9, "Dynamic dispatch").
pub trait CertificateFetcher {
    /// Fetch the DER or PEM bytes at `url`, honoring `deadline` as a hint for
    /// how long the implementation may block. Implementations are free to
    /// bail out earlier but must not exceed it.
    fn fetch(&self, url: &str, deadline: Duration) -> Result<Vec<u8>>;
}

/// A fetcher backed by a fixed in-memory map, keyed by URL. Exists for tests
/// and for deployments that pre-resolve certificates out of band.
pub struct StaticFetcher {
    entries: Vec<(String, Vec<u8>)>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn with(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.entries.push((url.into(), bytes));
        self
    }
}

impl Default for StaticFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl CertificateFetcher for StaticFetcher {
    fn fetch(&self, url: &str, _deadline: Duration) -> Result<Vec<u8>> {
        self.entries
            .iter()
            .find(|(u, _)| u == url)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| ShakenError::BadIdentityInfo(format!("no certificate available for {url}")))
    }
}

/// Trust anchors and revocation material a verification run is checked
/// against.
pub struct TrustStore {
    pub trust_roots: Vec<Vec<u8>>,
    pub crls: Vec<Vec<u8>>,
}

impl TrustStore {
    pub fn new(trust_roots: Vec<Vec<u8>>) -> Self {
        Self {
            trust_roots,
            crls: Vec::new(),
        }
    }

    pub fn with_crls(mut self, crls: Vec<Vec<u8>>) -> Self {
        self.crls = crls;
        self
    }
}

/// Everything a verification run needs beyond the raw header string.
pub struct VerifyOptions<'a, F: CertificateFetcher> {
    pub fetcher: &'a F,
    pub trust_store: &'a TrustStore,
    pub policy: VerifyPolicy,
    pub chain_policy: ChainPolicy,
    pub now: i64,
    pub fetch_deadline: Duration,
}

impl<'a, F: CertificateFetcher> VerifyOptions<'a, F> {
    pub fn new(fetcher: &'a F, trust_store: &'a TrustStore, now: i64) -> Self {
        Self {
            fetcher,
            trust_store,
            policy: VerifyPolicy::default(),
            chain_policy: ChainPolicy::default(),
            now,
            fetch_deadline: Duration::from_secs(10),
        }
    }
}

/// Successful verification result: typed claims plus the x5u they were
/// carried under.
#[derive(Debug, Clone)]
pub struct VerifyResult {
    pub claims: PassportClaims,
    pub x5u: String,
}

/// Run the full `Init -> ... -> Done` state machine against a raw Identity
/// header value.
pub fn verify<F: CertificateFetcher>(raw_header: &str, options: &VerifyOptions<F>) -> Result<VerifyResult> {
    // ParseHeader
    let header: IdentityHeader = identity_header::parse(raw_header, options.policy.allow_missing_ppt)?;

    let parsed_header_json = passport::decode_json_segment(&header.header_b64)?;
    let x5u = passport::verify_header_claims(&parsed_header_json, &options.policy)?;
    if x5u != header.info_url {
        return Err(ShakenError::InvalidIdentityHeader(
            "x5u claim does not match info parameter".into(),
        ));
    }

    // FetchCert
    let cert_bytes = options.fetcher.fetch(&header.info_url, options.fetch_deadline)?;
    let cert_der = x509::pem_or_der_to_der(&cert_bytes)?;

    // ValidateChain
    let (outcome, _tn_auth_list_uri) = x509::validate_chain(
        &cert_der,
        &options.trust_store.trust_roots,
        &options.trust_store.crls,
        &options.chain_policy,
    )?;
    if let Some(err) = x509::outcome_to_error(outcome) {
        return Err(err);
    }

    // VerifySig
    let verifying_key = cert_public_key(&cert_der)?;
    let signing_input = passport::signing_input(&header.header_b64, &header.payload_b64);
    let signature = crypto::b64url_decode(&header.signature_b64)?;
    if !crypto::verify(&verifying_key, &signing_input, &signature) {
        return Err(ShakenError::InvalidIdentityHeaderSignature);
    }

    // CheckClaims
    let payload_json = passport::decode_json_segment(&header.payload_b64)?;
    let claims = passport::verify_payload_claims(&payload_json, options.now, &options.policy)?;

    // Done
    Ok(VerifyResult { claims, x5u })
}

fn cert_public_key(cert_der: &[u8]) -> Result<p256::ecdsa::VerifyingKey> {
    use x509_parser::certificate::X509Certificate;
    use x509_parser::prelude::FromDer;

    let (_, cert) = X509Certificate::from_der(cert_der)
        .map_err(|e| ShakenError::UnsupportedCredential(format!("malformed certificate: {e:?}")))?;
    let point = &cert.public_key().subject_public_key.data;
    p256::ecdsa::VerifyingKey::from_sec1_bytes(point)
        .map_err(|e| ShakenError::UnsupportedCredential(format!("unsupported certificate public key: {e}")))
}
