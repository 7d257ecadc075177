use crate::config::ApiCredential;
use crate::core::candidates::{generate_plan, Candidate, Tier, TierPlan};
use crate::core::report::{rank_outcomes, VerificationReport};
use crate::core::verifier::{EmailVerifier, ProviderVerdict};
use crate::utils::error::{MailprobeError, Result};
use crate::utils::validation::require_field;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identity to probe. Field names match the public API of the endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub domain: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Deliverable,
    Undeliverable,
    Unknown,
}

/// The recorded result of verifying one candidate: a provider verdict, or
/// the error that stood in for one.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    pub email: String,
    pub tier: u32,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerificationOutcome {
    fn from_verdict(candidate: &Candidate, verdict: ProviderVerdict) -> Self {
        let kind = match verdict.is_deliverable {
            Some(true) => Verdict::Deliverable,
            Some(false) => Verdict::Undeliverable,
            None => Verdict::Unknown,
        };
        Self {
            email: candidate.email.clone(),
            tier: candidate.tier,
            verdict: kind,
            confidence_score: verdict.score,
            error: None,
        }
    }

    fn from_error(candidate: &Candidate, error: &MailprobeError) -> Self {
        Self {
            email: candidate.email.clone(),
            tier: candidate.tier,
            verdict: Verdict::Unknown,
            confidence_score: None,
            error: Some(error.to_string()),
        }
    }

    pub fn ranking_score(&self) -> f64 {
        self.confidence_score.unwrap_or(0.0)
    }
}

/// Per-tier tally handed to observers once every call in the tier has
/// settled.
#[derive(Debug, Clone, Serialize)]
pub struct TierSummary {
    pub tier: u32,
    pub deliverable: usize,
    pub total: usize,
}

/// How calls within one tier are dispatched. Tiers themselves are always
/// strictly sequential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// All calls of a tier in flight at once; the tier completes when all
    /// have settled. Used by the synchronous endpoint.
    Concurrent,
    /// One call at a time, each outcome observed before the next dispatch.
    /// Used by the streaming endpoint for deterministic event order.
    Sequential,
}

/// Progress hooks invoked as a verification run unfolds. A returned error
/// aborts the remaining work (the streaming adapter uses this when the
/// client goes away).
#[async_trait]
pub trait ProgressObserver: Send {
    async fn plan_ready(&mut self, _plan: &TierPlan) -> Result<()> {
        Ok(())
    }

    async fn tier_started(&mut self, _tier: &Tier) -> Result<()> {
        Ok(())
    }

    async fn outcome_recorded(&mut self, _outcome: &VerificationOutcome) -> Result<()> {
        Ok(())
    }

    async fn tier_finished(&mut self, _summary: &TierSummary) -> Result<()> {
        Ok(())
    }
}

/// Observer for callers that only want the final report.
pub struct NoopObserver;

#[async_trait]
impl ProgressObserver for NoopObserver {}

/// Drives one verification request tier by tier: most likely formats
/// first, stopping as soon as a tier produces a deliverable hit so the
/// less likely (paid) calls are never issued.
pub struct Orchestrator {
    verifier: Arc<dyn EmailVerifier>,
    credential: ApiCredential,
}

impl Orchestrator {
    pub fn new(verifier: Arc<dyn EmailVerifier>, credential: ApiCredential) -> Self {
        Self {
            verifier,
            credential,
        }
    }

    /// Everything that must hold before the first external call: required
    /// fields present, credential configured.
    pub fn validate(&self, request: &VerifyRequest) -> Result<()> {
        require_field("firstName", &request.first_name)?;
        require_field("lastName", &request.last_name)?;
        require_field("domain", &request.domain)?;
        self.credential.key()?;
        Ok(())
    }

    pub async fn run(
        &self,
        request: &VerifyRequest,
        mode: DispatchMode,
        observer: &mut dyn ProgressObserver,
    ) -> Result<VerificationReport> {
        self.validate(request)?;
        let first = request.first_name.trim();
        let last = request.last_name.trim();
        let domain = request.domain.trim();

        let plan = generate_plan(first, last, domain);
        tracing::info!(
            candidates = plan.total_candidates(),
            "📧 verifying variations for {} {} @ {}",
            first,
            last,
            domain
        );
        observer.plan_ready(&plan).await?;

        let mut outcomes: Vec<VerificationOutcome> = Vec::with_capacity(plan.total_candidates());
        let mut stopped_at_tier = plan.last_tier_index();
        let mut api_calls_saved = 0;

        for (position, tier) in plan.tiers.iter().enumerate() {
            observer.tier_started(tier).await?;

            let tier_outcomes = match mode {
                DispatchMode::Concurrent => {
                    let calls = tier.candidates.iter().map(|c| self.verify_candidate(c));
                    let settled = futures::future::join_all(calls).await;
                    let mut collected = Vec::with_capacity(settled.len());
                    for outcome in settled {
                        let outcome = outcome?;
                        observer.outcome_recorded(&outcome).await?;
                        collected.push(outcome);
                    }
                    collected
                }
                DispatchMode::Sequential => {
                    let mut collected = Vec::with_capacity(tier.candidates.len());
                    for candidate in &tier.candidates {
                        let outcome = self.verify_candidate(candidate).await?;
                        observer.outcome_recorded(&outcome).await?;
                        collected.push(outcome);
                    }
                    collected
                }
            };

            let deliverable = tier_outcomes
                .iter()
                .filter(|o| o.verdict == Verdict::Deliverable)
                .count();
            observer
                .tier_finished(&TierSummary {
                    tier: tier.index,
                    deliverable,
                    total: tier_outcomes.len(),
                })
                .await?;
            outcomes.extend(tier_outcomes);

            if deliverable > 0 {
                stopped_at_tier = tier.index;
                api_calls_saved = plan.tiers[position + 1..]
                    .iter()
                    .map(|t| t.candidates.len())
                    .sum();
                break;
            }
        }

        let deliverable_total = outcomes
            .iter()
            .filter(|o| o.verdict == Verdict::Deliverable)
            .count();
        let error_total = outcomes.iter().filter(|o| o.error.is_some()).count();
        let report = rank_outcomes(outcomes, api_calls_saved, stopped_at_tier);
        tracing::info!(
            deliverable = deliverable_total,
            errors = error_total,
            api_calls_used = report.api_calls_used,
            api_calls_saved = report.api_calls_saved,
            stopped_at_tier = report.stopped_at_tier,
            "✅ verification complete"
        );
        Ok(report)
    }

    /// A provider or transport failure becomes an outcome for this one
    /// candidate; anything else aborts the request.
    async fn verify_candidate(&self, candidate: &Candidate) -> Result<VerificationOutcome> {
        match self.verifier.verify(&candidate.email).await {
            Ok(verdict) => Ok(VerificationOutcome::from_verdict(candidate, verdict)),
            Err(e) if e.is_per_candidate() => {
                tracing::warn!(email = %candidate.email, error = %e, "verification call failed");
                Ok(VerificationOutcome::from_error(candidate, &e))
            }
            Err(e) => Err(e),
        }
    }
}
