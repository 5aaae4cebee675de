//! STIR/SHAKEN core: PASSporT construction and verification, the SIP
//! Identity header grammar, and the X.509 machinery (CA/CSR issuance, chain
//! validation) that backs call-authentication attestation.
//!
//! This crate has no knowledge of SIP transport, HTTP, or gRPC — it is the
//! engine the signing and verifying services on top of it drive.

pub mod authorize;
pub mod crypto;
pub mod error;
pub mod identity_header;
pub mod passport;
pub mod verify;
pub mod x509;

pub use authorize::{authorize, authorize_keep_passport, AuthorizeResult};
pub use crypto::KeyPair;
pub use error::{Result, ShakenError};
pub use identity_header::IdentityHeader;
pub use passport::{DestIdentity, OrigIdentity, PassportClaims, PassportParams, SignedPassport, VerifyPolicy};
pub use verify::{verify, CertificateFetcher, StaticFetcher, TrustStore, VerifyOptions, VerifyResult};
pub use x509::{pem_or_der_to_der, CaCertParams, ChainOutcome, ChainPolicy, IssuedCert, SpCertParams};
