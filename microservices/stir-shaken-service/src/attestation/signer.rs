//! Builds PASSporT params from a sign request and calls `shaken_core::authorize`.

use std::time::{SystemTime, UNIX_EPOCH};

use shaken_core::{DestIdentity, OrigIdentity, PassportParams};

use crate::certificate::CertificateManager;
use crate::types::{SignCallRequest, SignCallResponse};

pub struct AttestationSigner {
    cert_manager: std::sync::Arc<CertificateManager>,
}

impl AttestationSigner {
    pub fn new(cert_manager: std::sync::Arc<CertificateManager>) -> Self {
        Self { cert_manager }
    }

    pub fn sign(&self, request: &SignCallRequest) -> Result<SignCallResponse, SignError> {
        let cert = match &request.certificate_id {
            Some(id) => self.cert_manager.get_signing_cert(id).ok_or(SignError::CertificateNotFound)?,
            None => self.cert_manager.default_signing_cert().ok_or(SignError::NoCertificate)?,
        };

        if let Some(attest) = &request.attest {
            if !matches!(attest.as_str(), "A" | "B" | "C") {
                return Err(SignError::InvalidAttestation(attest.clone()));
            }
        }

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| SignError::ClockError(e.to_string()))?
            .as_secs() as i64;

        let mut params = PassportParams::new(
            cert.x5u.clone(),
            OrigIdentity::Tn(normalize_tn(&request.orig_tn)),
            DestIdentity::Tn(vec![normalize_tn(&request.dest_tn)]),
            now,
        );
        params.attest = request.attest.clone();
        params.origid = request.orig_id.clone();

        let identity_header = shaken_core::authorize(&params, &cert.key_pair.signing_key, &cert.x5u)
            .map_err(|e| SignError::SigningFailed(e.to_string()))?;

        Ok(SignCallResponse {
            identity_header,
            certificate_id: cert.id,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SignError {
    #[error("no active signing certificate available")]
    NoCertificate,
    #[error("certificate not found")]
    CertificateNotFound,
    #[error("invalid attestation level: {0}")]
    InvalidAttestation(String),
    #[error("clock error: {0}")]
    ClockError(String),
    #[error("signing failed: {0}")]
    SigningFailed(String),
}

/// Strips everything but an optional leading `+` and digits.
fn normalize_tn(tn: &str) -> String {
    let has_plus = tn.starts_with('+');
    let digits: String = tn.chars().filter(|c| c.is_ascii_digit()).collect();
    if has_plus {
        format!("+{digits}")
    } else {
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StirShakenConfig;

    fn config() -> StirShakenConfig {
        StirShakenConfig {
            http_bind: "0.0.0.0:0".into(),
            signing_cert_path: "/nonexistent".into(),
            signing_key_path: "/nonexistent".into(),
            signing_cert_x5u: "https://sp.example/sp.pem".into(),
            trust_root_dir: "/nonexistent-dir".into(),
            crl_dir: None,
            freshness_window_secs: 60,
            fetch_deadline: std::time::Duration::from_secs(10),
        }
    }

    #[test]
    fn sign_without_default_certificate_errors() {
        let manager = std::sync::Arc::new(CertificateManager::from_config(&config()).unwrap());
        let signer = AttestationSigner::new(manager);
        let request = SignCallRequest {
            orig_tn: "+12025550123".into(),
            dest_tn: "+12025550199".into(),
            attest: Some("A".into()),
            orig_id: None,
            certificate_id: None,
        };
        assert!(matches!(signer.sign(&request), Err(SignError::NoCertificate)));
    }

    #[test]
    fn sign_with_uploaded_certificate_succeeds() {
        let manager = std::sync::Arc::new(CertificateManager::from_config(&config()).unwrap());
        let kp = shaken_core::KeyPair::generate().unwrap();
        let ca = shaken_core::x509::issue_ca_cert(
            &kp,
            &shaken_core::CaCertParams {
                issuer_c: "US",
                issuer_cn: "Test CA",
                serial: 1,
                validity_days: 30,
            },
        )
        .unwrap();
        manager
            .upload(
                "primary".into(),
                &ca.pem,
                &kp.private_key_pem().unwrap(),
                "https://sp.example/sp.pem".into(),
                true,
            )
            .unwrap();

        let signer = AttestationSigner::new(manager);
        let request = SignCallRequest {
            orig_tn: "+12025550123".into(),
            dest_tn: "+12025550199".into(),
            attest: Some("A".into()),
            orig_id: Some("ref".into()),
            certificate_id: None,
        };
        let response = signer.sign(&request).unwrap();
        assert!(response.identity_header.contains(";alg=ES256"));
        assert!(response.identity_header.contains(";ppt=shaken"));
    }

    #[test]
    fn invalid_attestation_level_rejected() {
        let manager = std::sync::Arc::new(CertificateManager::from_config(&config()).unwrap());
        let signer = AttestationSigner::new(manager);
        let request = SignCallRequest {
            orig_tn: "+12025550123".into(),
            dest_tn: "+12025550199".into(),
            attest: Some("Z".into()),
            orig_id: None,
            certificate_id: None,
        };
        assert!(matches!(signer.sign(&request), Err(SignError::InvalidAttestation(_))));
    }
}
