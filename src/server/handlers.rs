use super::events::SseObserver;
use super::AppState;
use crate::core::orchestrator::{DispatchMode, NoopObserver, Orchestrator, VerifyRequest};
use crate::utils::error::MailprobeError;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::stream;
use serde_json::json;
use std::convert::Infallible;
use tokio::sync::mpsc;

impl IntoResponse for MailprobeError {
    fn into_response(self) -> Response {
        let status = match self {
            MailprobeError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// POST /api/verify: runs the whole tiered verification and answers with
/// the ranked report once every issued call has settled.
pub async fn verify(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Response {
    let orchestrator = Orchestrator::new(state.verifier.clone(), state.credential.clone());
    match orchestrator
        .run(&request, DispatchMode::Concurrent, &mut NoopObserver)
        .await
    {
        Ok(report) => Json(report).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/verify-stream: same orchestration, sequential dispatch, each
/// outcome pushed to the client as it settles. Validation failures are
/// plain JSON responses issued before any event-stream bytes.
pub async fn verify_stream(
    State(state): State<AppState>,
    Query(request): Query<VerifyRequest>,
) -> Response {
    let orchestrator = Orchestrator::new(state.verifier.clone(), state.credential.clone());
    if let Err(e) = orchestrator.validate(&request) {
        return e.into_response();
    }

    let (tx, rx) = mpsc::channel::<Event>(32);
    tokio::spawn(async move {
        let mut observer = SseObserver::new(tx.clone());
        match orchestrator
            .run(&request, DispatchMode::Sequential, &mut observer)
            .await
        {
            Ok(report) => {
                let payload = json!({
                    "apiCallsUsed": report.api_calls_used,
                    "apiCallsSaved": report.api_calls_saved,
                    "stoppedAtTier": report.stopped_at_tier,
                });
                if let Ok(event) = Event::default().event("complete").json_data(&payload) {
                    let _ = tx.send(event).await;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "streaming verification aborted");
                let payload = json!({ "message": e.to_string() });
                if let Ok(event) = Event::default().event("error").json_data(&payload) {
                    let _ = tx.send(event).await;
                }
            }
        }
    });

    let stream = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (Ok::<_, Infallible>(event), rx))
    });
    Sse::new(stream).keep_alive(KeepAlive::default()).into_response()
}
