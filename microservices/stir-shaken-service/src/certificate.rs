//! Certificate registry (ambient, §3 "Service-host persistence").

mod manager;

pub use manager::{CertificateManager, SigningCertificate};
