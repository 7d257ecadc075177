mod events;
mod handlers;

use crate::config::{ApiCredential, AppConfig};
use crate::core::verifier::{ApiLayerVerifier, EmailVerifier};
use crate::utils::error::{MailprobeError, Result};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use url::Url;

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<dyn EmailVerifier>,
    pub credential: ApiCredential,
}

impl AppState {
    pub fn new(verifier: Arc<dyn EmailVerifier>, credential: ApiCredential) -> Self {
        Self {
            verifier,
            credential,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let base_url = Url::parse(&config.verifier_url).map_err(|e| MailprobeError::Config {
            field: "verifier_url".to_string(),
            reason: e.to_string(),
        })?;
        let credential = config.credential();
        let verifier = Arc::new(ApiLayerVerifier::new(base_url, credential.clone()));
        Ok(Self::new(verifier, credential))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/verify", post(handlers::verify))
        .route("/api/verify-stream", get(handlers::verify_stream))
        .with_state(state)
}

pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;
    if !state.credential.is_configured() {
        tracing::warn!(
            "API key not configured; requests will fail until APILAYER_API_KEY is set"
        );
    }

    let app = router(state);
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(listen_addr = %addr, "mailprobe listening");

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    Ok(())
}
