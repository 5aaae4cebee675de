//! STIR/SHAKEN signing and verification service.
//!
//! Exposes `shaken-core`'s authorize/verify operations over HTTP: `/v1/sign`
//! issues a SIP Identity header for a call, `/v1/verify` validates one, and
//! `/v1/certificates` manages the signing identity and trust material this
//! instance uses.

mod api;
mod attestation;
mod certificate;
mod config;
mod types;
mod verification;

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use shaken_support::{HealthStatus, MicroserviceRuntime, ReadinessStatus, ShakenService};
use tokio::net::TcpListener;
use tracing::info;

use api::AppState;
use attestation::AttestationSigner;
use certificate::CertificateManager;
use config::StirShakenConfig;
use verification::VerificationService;

struct StirShakenMicroservice {
    config: StirShakenConfig,
    cert_manager: Arc<CertificateManager>,
    start_time: std::time::Instant,
}

#[async_trait]
impl ShakenService for StirShakenMicroservice {
    fn service_id(&self) -> &'static str {
        "stir-shaken-service"
    }

    async fn health(&self) -> HealthStatus {
        HealthStatus {
            healthy: true,
            service_id: self.service_id().to_string(),
            version: self.version().to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    async fn ready(&self) -> ReadinessStatus {
        ReadinessStatus {
            ready: self.cert_manager.has_default_signing_cert(),
            dependencies: vec![],
        }
    }

    async fn shutdown(&self) -> shaken_support::Result<()> {
        info!("stir-shaken-service shutting down");
        Ok(())
    }

    async fn start(&self) -> shaken_support::Result<()> {
        let signer = Arc::new(AttestationSigner::new(self.cert_manager.clone()));
        let verifier = Arc::new(
            VerificationService::new(self.cert_manager.clone(), &self.config)
                .map_err(|e| shaken_support::ShakenSupportError::Internal(e.to_string()))?,
        );

        let state = AppState {
            cert_manager: self.cert_manager.clone(),
            signer,
            verifier,
        };
        let app = api::router(state);

        let addr: SocketAddr = self
            .config
            .http_bind
            .parse()
            .map_err(|e| shaken_support::ShakenSupportError::Config(format!("invalid HTTP_BIND: {e}")))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| shaken_support::ShakenSupportError::Network(e.to_string()))?;

        info!(%addr, "stir-shaken-service listening");
        axum::serve(listener, app)
            .await
            .map_err(|e| shaken_support::ShakenSupportError::Network(e.to_string()))?;

        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _telemetry = shaken_telemetry::init("stir-shaken-service")
        .map_err(|e| anyhow::anyhow!("failed to initialize telemetry: {e}"))?;

    let config = StirShakenConfig::from_env()?;
    let cert_manager = Arc::new(CertificateManager::from_config(&config)?);

    let service = Arc::new(StirShakenMicroservice {
        config,
        cert_manager,
        start_time: std::time::Instant::now(),
    });

    MicroserviceRuntime::run(service).await?;
    Ok(())
}
