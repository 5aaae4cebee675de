//! REST handlers: `/v1/sign`, `/v1/verify`, `/v1/certificates`, `/health`, `/ready`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::attestation::AttestationSigner;
use crate::certificate::CertificateManager;
use crate::types::{SignCallRequest, UploadCertificateRequest, VerifyCallRequest};
use crate::verification::VerificationService;

#[derive(Clone)]
pub struct AppState {
    pub cert_manager: Arc<CertificateManager>,
    pub signer: Arc<AttestationSigner>,
    pub verifier: Arc<VerificationService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/v1/sign", post(sign))
        .route("/v1/verify", post(verify))
        .route("/v1/certificates", get(list_certificates).post(upload_certificate))
        .route("/v1/certificates/{id}", delete(delete_certificate))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "healthy": true }))
}

async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.cert_manager.has_default_signing_cert();
    let status = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(json!({ "ready": ready })))
}

async fn sign(State(state): State<AppState>, Json(request): Json<SignCallRequest>) -> Response {
    match state.signer.sign(&request) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}

async fn verify(State(state): State<AppState>, Json(request): Json<VerifyCallRequest>) -> Response {
    let response = state.verifier.verify(request.identity_header).await;
    let status = StatusCode::from_u16(response.sip_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response)).into_response()
}

async fn list_certificates(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.cert_manager.list())
}

async fn upload_certificate(
    State(state): State<AppState>,
    Json(request): Json<UploadCertificateRequest>,
) -> Response {
    match state.cert_manager.upload(
        request.name,
        &request.certificate_pem,
        &request.private_key_pem,
        request.x5u,
        request.set_as_default,
    ) {
        Ok(id) => (StatusCode::CREATED, Json(json!({ "id": id }))).into_response(),
        Err(err) => ApiError(err.status_code(), err.to_string()).into_response(),
    }
}

async fn delete_certificate(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    state.cert_manager.delete(&id);
    StatusCode::NO_CONTENT
}

/// Maps a `shaken_core::ShakenError` (SIP 403/428/436/437/438) or a generic
/// failure onto the matching HTTP status, per RFC 8224 §6.2.
struct ApiError(u16, String);

impl From<shaken_core::ShakenError> for ApiError {
    fn from(err: shaken_core::ShakenError) -> Self {
        Self(err.sip_status(), err.to_string())
    }
}

impl From<crate::attestation::SignError> for ApiError {
    fn from(err: crate::attestation::SignError) -> Self {
        let status = match &err {
            crate::attestation::SignError::NoCertificate
            | crate::attestation::SignError::CertificateNotFound => 404,
            crate::attestation::SignError::InvalidAttestation(_) => 400,
            crate::attestation::SignError::ClockError(_) | crate::attestation::SignError::SigningFailed(_) => 500,
        };
        Self(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "error": self.1 }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StirShakenConfig;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

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
    async fn health_reports_ok() {
        let config = config();
        let cert_manager = Arc::new(CertificateManager::from_config(&config).unwrap());
        let state = AppState {
            signer: Arc::new(AttestationSigner::new(cert_manager.clone())),
            verifier: Arc::new(VerificationService::new(cert_manager.clone(), &config).unwrap()),
            cert_manager,
        };
        let app = router(state);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn ready_reports_unavailable_without_default_certificate() {
        let config = config();
        let cert_manager = Arc::new(CertificateManager::from_config(&config).unwrap());
        let state = AppState {
            signer: Arc::new(AttestationSigner::new(cert_manager.clone())),
            verifier: Arc::new(VerificationService::new(cert_manager.clone(), &config).unwrap()),
            cert_manager,
        };
        let app = router(state);

        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
