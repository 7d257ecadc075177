use crate::core::orchestrator::VerificationOutcome;
use serde::Serialize;

/// Final answer for one verification request: every recorded outcome
/// ranked by confidence, plus the call bookkeeping.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub results: Vec<VerificationOutcome>,
    pub api_calls_used: usize,
    pub api_calls_saved: usize,
    pub stopped_at_tier: u32,
}

/// Sorts outcomes by descending confidence score, an absent score (error
/// outcome) ranking as 0.0. The sort is stable, so tied scores keep their
/// tier-then-candidate dispatch order.
pub fn rank_outcomes(
    mut outcomes: Vec<VerificationOutcome>,
    api_calls_saved: usize,
    stopped_at_tier: u32,
) -> VerificationReport {
    outcomes.sort_by(|a, b| b.ranking_score().total_cmp(&a.ranking_score()));
    VerificationReport {
        api_calls_used: outcomes.len(),
        api_calls_saved,
        stopped_at_tier,
        results: outcomes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::orchestrator::Verdict;

    fn outcome(email: &str, tier: u32, score: Option<f64>) -> VerificationOutcome {
        VerificationOutcome {
            email: email.to_string(),
            tier,
            verdict: if score.is_some() {
                Verdict::Undeliverable
            } else {
                Verdict::Unknown
            },
            confidence_score: score,
            error: score.is_none().then(|| "provider returned 500".to_string()),
        }
    }

    #[test]
    fn test_sorts_descending_by_score() {
        let report = rank_outcomes(
            vec![
                outcome("low@acme.com", 1, Some(0.1)),
                outcome("high@acme.com", 2, Some(0.9)),
                outcome("mid@acme.com", 3, Some(0.5)),
            ],
            0,
            3,
        );
        let order: Vec<_> = report.results.iter().map(|o| o.email.as_str()).collect();
        assert_eq!(order, vec!["high@acme.com", "mid@acme.com", "low@acme.com"]);
    }

    #[test]
    fn test_error_outcomes_rank_as_zero() {
        let report = rank_outcomes(
            vec![
                outcome("failed@acme.com", 1, None),
                outcome("scored@acme.com", 1, Some(0.05)),
            ],
            0,
            1,
        );
        assert_eq!(report.results[0].email, "scored@acme.com");
        assert_eq!(report.results[1].email, "failed@acme.com");
    }

    #[test]
    fn test_tied_scores_keep_dispatch_order() {
        let report = rank_outcomes(
            vec![
                outcome("a@acme.com", 1, Some(0.2)),
                outcome("b@acme.com", 1, Some(0.2)),
                outcome("c@acme.com", 2, Some(0.2)),
            ],
            0,
            2,
        );
        let order: Vec<_> = report.results.iter().map(|o| o.email.as_str()).collect();
        assert_eq!(order, vec!["a@acme.com", "b@acme.com", "c@acme.com"]);
    }

    #[test]
    fn test_zero_scored_outcome_does_not_fall_below_errors_dispatched_later() {
        let report = rank_outcomes(
            vec![
                outcome("zero@acme.com", 1, Some(0.0)),
                outcome("failed@acme.com", 1, None),
            ],
            0,
            1,
        );
        assert_eq!(report.results[0].email, "zero@acme.com");
    }

    #[test]
    fn test_bookkeeping_is_passed_through() {
        let report = rank_outcomes(vec![outcome("a@acme.com", 1, Some(0.2))], 24, 1);
        assert_eq!(report.api_calls_used, 1);
        assert_eq!(report.api_calls_saved, 24);
        assert_eq!(report.stopped_at_tier, 1);
    }

    #[test]
    fn test_wire_shape_is_camel_case() {
        let report = rank_outcomes(vec![outcome("a@acme.com", 1, None)], 0, 1);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("apiCallsUsed").is_some());
        assert!(json.get("apiCallsSaved").is_some());
        assert!(json.get("stoppedAtTier").is_some());
        let first = &json["results"][0];
        assert_eq!(first["verdict"], "unknown");
        assert!(first.get("confidenceScore").is_none());
        assert!(first.get("error").is_some());
    }
}
