use crate::core::candidates::{Tier, TierPlan};
use crate::core::orchestrator::{ProgressObserver, TierSummary, VerificationOutcome};
use crate::utils::error::{MailprobeError, Result};
use async_trait::async_trait;
use axum::response::sse::Event;
use serde::Serialize;
use serde_json::json;
use tokio::sync::mpsc;

/// Forwards orchestrator progress to the SSE channel. A failed send means
/// the client went away, and the resulting error aborts the run.
pub struct SseObserver {
    tx: mpsc::Sender<Event>,
}

impl SseObserver {
    pub fn new(tx: mpsc::Sender<Event>) -> Self {
        Self { tx }
    }

    async fn send(&self, name: &'static str, payload: &impl Serialize) -> Result<()> {
        let event = Event::default()
            .event(name)
            .json_data(payload)
            .map_err(|e| MailprobeError::internal(format!("event serialization failed: {e}")))?;
        self.tx
            .send(event)
            .await
            .map_err(|_| MailprobeError::internal("event stream closed by client"))
    }
}

#[async_trait]
impl ProgressObserver for SseObserver {
    async fn plan_ready(&mut self, plan: &TierPlan) -> Result<()> {
        let variations: Vec<_> = plan.candidates().collect();
        self.send("init", &json!({ "variations": variations })).await
    }

    async fn tier_started(&mut self, tier: &Tier) -> Result<()> {
        self.send(
            "tier-start",
            &json!({
                "tier": tier.index,
                "name": tier.name,
                "count": tier.candidates.len(),
            }),
        )
        .await
    }

    async fn outcome_recorded(&mut self, outcome: &VerificationOutcome) -> Result<()> {
        self.send("result", outcome).await
    }

    async fn tier_finished(&mut self, summary: &TierSummary) -> Result<()> {
        self.send("tier-complete", summary).await
    }
}
