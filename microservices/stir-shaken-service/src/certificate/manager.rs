//! In-memory certificate/trust-material registry.
//!
//! Not a durable certificate store with rotation policy (that is a Non-goal
//! per spec §1) — a single-process cache seeded from disk at startup and
//! mutable at runtime through the management endpoints. Restart loses
//! runtime uploads not also present on disk.

use std::sync::{Arc, RwLock};

use dashmap::DashMap;
use shaken_core::{KeyPair, TrustStore};
use shaken_support::error::{Result, ShakenSupportError};
use uuid::Uuid;

use crate::config::{load_der_dir, StirShakenConfig};
use crate::types::CertificateSummary;

/// A signing certificate ready to back `authorize()` calls.
#[derive(Clone)]
pub struct SigningCertificate {
    pub id: String,
    pub name: String,
    pub x5u: String,
    pub key_pair: Arc<KeyPair>,
    pub cert_der: Vec<u8>,
}

#[derive(Clone)]
struct Entry {
    cert: SigningCertificate,
}

pub struct CertificateManager {
    entries: DashMap<String, Entry>,
    default_id: RwLock<Option<String>>,
    trust_store: RwLock<Arc<TrustStore>>,
}

impl CertificateManager {
    /// Load the configured signing certificate/key and trust roots/CRLs
    /// from disk. A missing signing cert is not an error here — a service
    /// can start with no default signing identity and have one uploaded
    /// later — but verification requires the trust root directory to exist
    /// (an empty directory is fine; every cert is then `Untrusted`).
    pub fn from_config(config: &StirShakenConfig) -> Result<Self> {
        let entries = DashMap::new();
        let mut default_id = None;

        if let (Ok(cert_pem), Ok(key_pem)) = (
            std::fs::read_to_string(&config.signing_cert_path),
            std::fs::read_to_string(&config.signing_key_path),
        ) {
            let key_pair = KeyPair::from_private_pem(&key_pem)
                .map_err(|e| ShakenSupportError::Config(format!("loading signing key: {e}")))?;
            let cert_der = shaken_core::pem_or_der_to_der(cert_pem.as_bytes())
                .map_err(|e| ShakenSupportError::Config(format!("loading signing cert: {e}")))?;

            let id = Uuid::new_v4().to_string();
            entries.insert(
                id.clone(),
                Entry {
                    cert: SigningCertificate {
                        id: id.clone(),
                        name: "default".to_string(),
                        x5u: config.signing_cert_x5u.clone(),
                        key_pair: Arc::new(key_pair),
                        cert_der,
                    },
                },
            );
            default_id = Some(id);
        }

        let trust_roots = load_der_pem_dir(&config.trust_root_dir)?;
        let crls = match &config.crl_dir {
            Some(dir) => load_der_pem_dir(dir)?,
            None => Vec::new(),
        };

        Ok(Self {
            entries,
            default_id: RwLock::new(default_id),
            trust_store: RwLock::new(Arc::new(TrustStore::new(trust_roots).with_crls(crls))),
        })
    }

    pub fn has_default_signing_cert(&self) -> bool {
        self.default_id.read().map(|g| g.is_some()).unwrap_or(false)
    }

    pub fn default_signing_cert(&self) -> Option<SigningCertificate> {
        let id = self.default_id.read().ok()?.clone()?;
        self.get_signing_cert(&id)
    }

    pub fn get_signing_cert(&self, id: &str) -> Option<SigningCertificate> {
        self.entries.get(id).map(|e| e.cert.clone())
    }

    pub fn trust_store(&self) -> Arc<TrustStore> {
        self.trust_store.read().expect("trust store lock poisoned").clone()
    }

    pub fn upload(&self, name: String, cert_pem: &str, key_pem: &str, x5u: String, set_as_default: bool) -> Result<String> {
        let key_pair = KeyPair::from_private_pem(key_pem)
            .map_err(|e| ShakenSupportError::Validation(format!("invalid private key: {e}")))?;
        let cert_der = shaken_core::pem_or_der_to_der(cert_pem.as_bytes())
            .map_err(|e| ShakenSupportError::Validation(format!("invalid certificate: {e}")))?;

        let id = Uuid::new_v4().to_string();
        self.entries.insert(
            id.clone(),
            Entry {
                cert: SigningCertificate {
                    id: id.clone(),
                    name,
                    x5u,
                    key_pair: Arc::new(key_pair),
                    cert_der,
                },
            },
        );

        if set_as_default {
            *self.default_id.write().expect("default id lock poisoned") = Some(id.clone());
        }

        Ok(id)
    }

    pub fn delete(&self, id: &str) {
        self.entries.remove(id);
        let mut default_id = self.default_id.write().expect("default id lock poisoned");
        if default_id.as_deref() == Some(id) {
            *default_id = None;
        }
    }

    pub fn list(&self) -> Vec<CertificateSummary> {
        let default_id = self.default_id.read().ok().and_then(|g| g.clone());
        self.entries
            .iter()
            .map(|e| CertificateSummary {
                id: e.cert.id.clone(),
                name: e.cert.name.clone(),
                x5u: e.cert.x5u.clone(),
                is_default: default_id.as_deref() == Some(e.cert.id.as_str()),
            })
            .collect()
    }
}

fn load_der_pem_dir(dir: &str) -> Result<Vec<Vec<u8>>> {
    load_der_dir(dir)?
        .into_iter()
        .map(|bytes| shaken_core::pem_or_der_to_der(&bytes).map_err(|e| ShakenSupportError::Config(e.to_string())))
        .collect()
}
