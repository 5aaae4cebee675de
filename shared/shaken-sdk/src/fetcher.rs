//! An HTTP-backed `CertificateFetcher` (§4.8, §9 "Dynamic dispatch").
//!
//! `shaken-core::verify` never opens a socket itself; it is handed a
//! capability. This is the capability every deployment in this codebase
//! that doesn't pre-resolve certificates out of band actually wants: a GET
//! against the `x5u` URL, DER or PEM auto-detected by the core, bounded by
//! the caller-supplied deadline.

use std::time::Duration;

use shaken_core::error::{Result, ShakenError};
use shaken_core::verify::CertificateFetcher;

/// Fetches certificate bytes over HTTPS. Uses a blocking client because the
/// fetcher trait is a plain blocking call — callers running inside an async
/// runtime should invoke `fetch` via `spawn_blocking`. Cheap to clone: the
/// underlying client is reference-counted internally.
#[derive(Clone)]
pub struct HttpCertificateFetcher {
    client: reqwest::blocking::Client,
}

impl HttpCertificateFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| ShakenError::GeneralError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Default for HttpCertificateFetcher {
    fn default() -> Self {
        Self::new().expect("default HTTP client construction should not fail")
    }
}

impl CertificateFetcher for HttpCertificateFetcher {
    fn fetch(&self, url: &str, deadline: Duration) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .timeout(deadline)
            .send()
            .map_err(|e| ShakenError::BadIdentityInfo(format!("fetching {url} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ShakenError::BadIdentityInfo(format!(
                "fetching {url} returned HTTP {}",
                response.status()
            )));
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| ShakenError::BadIdentityInfo(format!("reading body from {url} failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_url_maps_to_bad_identity_info() {
        let fetcher = HttpCertificateFetcher::new().unwrap();
        let err = fetcher
            .fetch("https://127.0.0.1.invalid/sp.pem", Duration::from_millis(200))
            .unwrap_err();
        assert_eq!(err.sip_status(), 436);
    }
}
