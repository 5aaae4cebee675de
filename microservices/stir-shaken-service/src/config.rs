//! STIR/SHAKEN service configuration (ambient, §4.9).
//!
//! File paths and policy knobs the service needs to load key/cert/trust
//! material and drive `shaken-core`; the `shaken-support::ServiceConfig`
//! pattern (env-var driven, defaulted) extended with this service's own
//! settings.

use std::time::Duration;

use shaken_support::error::{Result, ShakenSupportError};

#[derive(Debug, Clone)]
pub struct StirShakenConfig {
    /// HTTP bind address for the REST surface.
    pub http_bind: String,
    /// PEM path for this service's active signing certificate.
    pub signing_cert_path: String,
    /// PEM path for the matching private key.
    pub signing_key_path: String,
    /// The x5u URL callers should use to fetch `signing_cert_path`.
    pub signing_cert_x5u: String,
    /// Directory of trusted CA certificates (PEM), one file per root.
    pub trust_root_dir: String,
    /// Optional directory of CRLs (PEM/DER), matched against issuers at
    /// verification time.
    pub crl_dir: Option<String>,
    /// PASSporT freshness window in seconds (§3, default 60).
    pub freshness_window_secs: i64,
    /// Deadline for fetching a referenced certificate (§5, default 10s).
    pub fetch_deadline: Duration,
}

impl StirShakenConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            http_bind: std::env::var("STIR_SHAKEN_HTTP_BIND")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            signing_cert_path: std::env::var("STIR_SHAKEN_SIGNING_CERT")
                .unwrap_or_else(|_| "/etc/stir-shaken/signing-cert.pem".to_string()),
            signing_key_path: std::env::var("STIR_SHAKEN_SIGNING_KEY")
                .unwrap_or_else(|_| "/etc/stir-shaken/signing-key.pem".to_string()),
            signing_cert_x5u: std::env::var("STIR_SHAKEN_SIGNING_CERT_X5U")
                .unwrap_or_else(|_| "https://sp.example/signing-cert.pem".to_string()),
            trust_root_dir: std::env::var("STIR_SHAKEN_TRUST_ROOT_DIR")
                .unwrap_or_else(|_| "/etc/stir-shaken/trust-roots".to_string()),
            crl_dir: std::env::var("STIR_SHAKEN_CRL_DIR").ok(),
            freshness_window_secs: std::env::var("STIR_SHAKEN_FRESHNESS_WINDOW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
            fetch_deadline: Duration::from_secs(
                std::env::var("STIR_SHAKEN_FETCH_DEADLINE_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        })
    }
}

/// Read every `.pem`/`.der`/`.crt` file directly under `dir` as candidate
/// DER bytes (auto-detecting PEM), skipping anything that fails to parse.
pub fn load_der_dir(dir: &str) -> Result<Vec<Vec<u8>>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ShakenSupportError::Config(format!("reading {dir}: {e}"))),
    };

    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ShakenSupportError::Config(format!("reading {dir}: {e}")))?;
        if !entry.path().is_file() {
            continue;
        }
        let bytes = std::fs::read(entry.path())
            .map_err(|e| ShakenSupportError::Config(format!("reading {:?}: {e}", entry.path())))?;
        out.push(bytes);
    }
    Ok(out)
}
