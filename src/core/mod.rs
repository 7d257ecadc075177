pub mod candidates;
pub mod orchestrator;
pub mod report;
pub mod verifier;

pub use crate::utils::error::Result;
pub use candidates::{generate_plan, Candidate, Tier, TierPlan};
pub use orchestrator::{
    DispatchMode, NoopObserver, Orchestrator, ProgressObserver, TierSummary, Verdict,
    VerificationOutcome, VerifyRequest,
};
pub use report::VerificationReport;
pub use verifier::{ApiLayerVerifier, EmailVerifier, ProviderVerdict};
