//! Verification Service host (C6, ambient).

mod verifier;

pub use verifier::VerificationService;
