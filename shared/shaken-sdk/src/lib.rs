//! Stable library API over `shaken-core` (§6, §4.8).
//!
//! Every in-repo caller that wants to sign or verify a call, or issue key
//! and certificate material, imports this crate rather than reaching into
//! `shaken-core`'s module layout directly. Nothing here re-implements
//! PASSporT, X.509, or crypto logic — it is a facade.

pub mod fetcher;

pub use fetcher::HttpCertificateFetcher;

pub use shaken_core::{
    authorize, authorize_keep_passport, verify, AuthorizeResult, CaCertParams, CertificateFetcher,
    ChainOutcome, ChainPolicy, DestIdentity, IdentityHeader, IssuedCert, KeyPair, OrigIdentity,
    PassportClaims, PassportParams, Result, ShakenError, SignedPassport, SpCertParams,
    StaticFetcher, TrustStore, VerifyOptions, VerifyPolicy, VerifyResult,
};

pub use shaken_core::x509::{
    generate_csr, issue_ca_cert, issue_sp_cert, pem_or_der_to_der, subject_hash_filename, validate_chain,
};

/// Generate a fresh ES256 keypair. Thin alias over `KeyPair::generate` kept
/// for symmetry with the other `generate_*`/`issue_*` free functions in the
/// §6 Library API.
pub fn generate_keys() -> Result<KeyPair> {
    KeyPair::generate()
}
