use serde::Serialize;
use std::collections::HashSet;

/// One guessed address plus the likelihood tier it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub email: String,
    pub tier: u32,
}

/// A priority group of candidates sharing a similar likelihood of being
/// the person's real address.
#[derive(Debug, Clone)]
pub struct Tier {
    pub index: u32,
    pub name: &'static str,
    pub candidates: Vec<Candidate>,
}

/// Ordered tiers, most likely first. Built once per request and consumed
/// read-only by the orchestrator.
#[derive(Debug, Clone)]
pub struct TierPlan {
    pub tiers: Vec<Tier>,
}

impl TierPlan {
    pub fn total_candidates(&self) -> usize {
        self.tiers.iter().map(|t| t.candidates.len()).sum()
    }

    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.tiers.iter().flat_map(|t| t.candidates.iter())
    }

    pub fn last_tier_index(&self) -> u32 {
        self.tiers.last().map(|t| t.index).unwrap_or(0)
    }
}

const TIER_NAMES: [&str; 3] = [
    "most common formats",
    "common formats",
    "remaining permutations",
];

/// Generates the fixed three-tier plan of local-part variations for a
/// person at a domain. Names are trimmed and lowercased; the domain
/// likewise, so identical requests always produce identical plans.
///
/// Tier membership and ordering are fixed policy. A later pattern whose
/// rendered email already appeared is dropped, which only happens for
/// degenerate names (e.g. a single-letter first name makes `flast` and
/// `firstlast` collide).
pub fn generate_plan(first_name: &str, last_name: &str, domain: &str) -> TierPlan {
    let f = first_name.trim().to_lowercase();
    let l = last_name.trim().to_lowercase();
    let domain = domain.trim().to_lowercase();
    let fi = initial(&f);
    let li = initial(&l);

    let tier_locals: [Vec<String>; 3] = [
        vec![
            format!("{f}.{l}"),
            f.clone(),
            format!("{fi}{l}"),
            format!("{f}{l}"),
        ],
        vec![
            l.clone(),
            format!("{f}_{l}"),
            format!("{f}-{l}"),
            format!("{l}.{f}"),
            format!("{fi}.{l}"),
        ],
        vec![
            format!("{l}{f}"),
            format!("{l}_{f}"),
            format!("{l}-{f}"),
            format!("{fi}_{l}"),
            format!("{fi}-{l}"),
            format!("{f}{li}"),
            format!("{f}.{li}"),
            format!("{f}_{li}"),
            format!("{f}-{li}"),
            format!("{fi}{li}"),
            format!("{fi}.{li}"),
            format!("{l}{fi}"),
            format!("{l}.{fi}"),
            format!("{l}_{fi}"),
            format!("{l}-{fi}"),
            format!("{li}{f}"),
            format!("{li}.{f}"),
            format!("{li}_{f}"),
            format!("{li}-{f}"),
        ],
    ];

    let mut seen = HashSet::new();
    let tiers = tier_locals
        .into_iter()
        .zip(TIER_NAMES)
        .enumerate()
        .map(|(i, (locals, name))| {
            let index = (i + 1) as u32;
            let candidates = locals
                .into_iter()
                .map(|local| format!("{local}@{domain}"))
                .filter(|email| seen.insert(email.clone()))
                .map(|email| Candidate { email, tier: index })
                .collect();
            Tier {
                index,
                name,
                candidates,
            }
        })
        .collect();

    TierPlan { tiers }
}

fn initial(name: &str) -> String {
    name.chars().next().map(String::from).unwrap_or_default()
}
