//! Wraps `shaken_core::verify` with this service's certificate fetcher and
//! trust store, and maps the outcome onto the wire response shape.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use shaken_core::verify::{TrustStore, VerifyOptions};
use shaken_core::{DestIdentity, OrigIdentity, ShakenError};
use shaken_sdk::HttpCertificateFetcher;

use crate::certificate::CertificateManager;
use crate::config::StirShakenConfig;
use crate::types::VerifyCallResponse;

pub struct VerificationService {
    cert_manager: Arc<CertificateManager>,
    fetcher: HttpCertificateFetcher,
    freshness_window_secs: i64,
    fetch_deadline: std::time::Duration,
}

impl VerificationService {
    pub fn new(cert_manager: Arc<CertificateManager>, config: &StirShakenConfig) -> Result<Self, ShakenError> {
        Ok(Self {
            cert_manager,
            fetcher: HttpCertificateFetcher::new()?,
            freshness_window_secs: config.freshness_window_secs,
            fetch_deadline: config.fetch_deadline,
        })
    }

    /// Runs the blocking `shaken_core::verify` state machine via
    /// `spawn_blocking`, since its `CertificateFetcher` is a plain blocking
    /// call and must never run on the async reactor thread.
    pub async fn verify(&self, identity_header: String) -> VerifyCallResponse {
        let cert_manager = self.cert_manager.clone();
        let fetcher = self.fetcher.clone();
        let freshness_window_secs = self.freshness_window_secs;
        let fetch_deadline = self.fetch_deadline;

        let outcome = tokio::task::spawn_blocking(move || {
            run_verify(&identity_header, &cert_manager, &fetcher, freshness_window_secs, fetch_deadline)
        })
        .await;

        match outcome {
            Ok(response) => response,
            Err(_) => VerifyCallResponse {
                sip_status: 500,
                error: Some("verification task panicked".to_string()),
                ..Default::default()
            },
        }
    }
}

fn run_verify(
    identity_header: &str,
    cert_manager: &CertificateManager,
    fetcher: &HttpCertificateFetcher,
    freshness_window_secs: i64,
    fetch_deadline: std::time::Duration,
) -> VerifyCallResponse {
    let shared_store = cert_manager.trust_store();
    let trust_store = TrustStore::new(shared_store.trust_roots.clone()).with_crls(shared_store.crls.clone());

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);

    let mut options = VerifyOptions::new(fetcher, &trust_store, now);
    options.policy.freshness_window_secs = freshness_window_secs;
    options.fetch_deadline = fetch_deadline;

    match shaken_core::verify::verify(identity_header, &options) {
        Ok(result) => VerifyCallResponse {
            sip_status: 200,
            attest: result.claims.attest,
            orig_tn: orig_tn(&result.claims.orig),
            dest_tn: dest_tn(&result.claims.dest),
            origid: result.claims.origid,
            x5u: Some(result.x5u),
            error: None,
        },
        Err(err) => VerifyCallResponse {
            sip_status: err.sip_status(),
            error: Some(err.to_string()),
            ..Default::default()
        },
    }
}

fn orig_tn(orig: &OrigIdentity) -> Option<String> {
    match orig {
        OrigIdentity::Tn(tn) => Some(tn.clone()),
        OrigIdentity::Uri(_) => None,
    }
}

fn dest_tn(dest: &DestIdentity) -> Option<String> {
    match dest {
        DestIdentity::Tn(tns) => tns.first().cloned(),
        DestIdentity::Uri(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shaken_core::{authorize, PassportParams};

    fn config() -> StirShakenConfig {
        StirShakenConfig {
            http_bind: "0.0.0.0:0".into(),
            signing_cert_path: "/nonexistent".into(),
            signing_key_path: "/nonexistent".into(),
            signing_cert_x5u: "https://sp.example/sp.pem".into(),
            trust_root_dir: "/nonexistent-dir".into(),
            crl_dir: None,
            freshness_window_secs: 60,
            fetch_deadline: std::time::Duration::from_millis(200),
        }
    }

    #[tokio::test]
    async fn unreachable_x5u_maps_to_sip_436() {
        let cert_manager = Arc::new(CertificateManager::from_config(&config()).unwrap());
        let service = VerificationService::new(cert_manager, &config()).unwrap();

        let kp = shaken_core::KeyPair::generate().unwrap();
        let x5u = "https://127.0.0.1.invalid/sp.pem";
        let params = PassportParams::new(
            x5u,
            OrigIdentity::Tn("12025550123".into()),
            DestIdentity::Tn(vec!["12025550199".into()]),
            1577836800,
        );
        let header = authorize(&params, &kp.signing_key, x5u).unwrap();

        let response = service.verify(header).await;
        assert_eq!(response.sip_status, 436);
    }
}
