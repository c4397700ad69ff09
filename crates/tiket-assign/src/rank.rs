//! Ranking of eligible technicians.

use std::cmp::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tiket_model::{AssignmentJob, Priority, TechnicianId, TechnicianProfile, Tier};

/// Why a ranking could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RankError {
    #[error("ranker failed: {0}")]
    Failed(String),

    #[error("ranker did not answer within {0:?}")]
    Timeout(Duration),

    #[error("ranker returned no technicians")]
    EmptyRanking,

    /// The top-ranked id is not in the candidate pool.
    #[error("ranker chose {0}, who is not an eligible candidate")]
    UnknownCandidate(TechnicianId),
}

/// Orders eligible technicians for a job, best first.
///
/// Implementations may call out to an external service; the engine bounds
/// every call with a timeout and falls back on any error.
#[async_trait]
pub trait Ranker: Send + Sync {
    async fn rank(
        &self,
        job: &AssignmentJob,
        candidates: &[TechnicianProfile],
    ) -> Result<Vec<TechnicianId>, RankError>;

    /// Name shown in decision rationales.
    fn name(&self) -> &'static str {
        "ranker"
    }
}

const REGION_BONUS: f64 = 0.1;

fn priority_weight(priority: Priority) -> f64 {
    match priority {
        Priority::P1 => 1.2,
        Priority::P2 => 1.05,
        Priority::P3 => 1.0,
    }
}

fn tier_bonus(tier: Tier) -> f64 {
    match tier {
        Tier::L3 => 1.0,
        Tier::L2 => 0.9,
        Tier::L1 => 0.75,
    }
}

/// Combined heuristic score of a technician for a job.
pub fn heuristic_score(job: &AssignmentJob, technician: &TechnicianProfile) -> f64 {
    let capacity_left = 1.0 - technician.workload_ratio().min(1.0);
    let region = match &job.region {
        Some(region) if technician.regions.contains(region) => REGION_BONUS,
        _ => 0.0,
    };
    priority_weight(job.priority) * tier_bonus(technician.tier) * capacity_left + region
}

/// Default ranker: priority, tier, spare capacity and region.
///
/// Equal scores are ordered by lower workload ratio, then by id.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicRanker;

impl HeuristicRanker {
    pub fn ranking(job: &AssignmentJob, candidates: &[TechnicianProfile]) -> Vec<TechnicianId> {
        let mut scored: Vec<(f64, &TechnicianProfile)> = candidates
            .iter()
            .map(|technician| (heuristic_score(job, technician), technician))
            .collect();
        scored.sort_by(|(score_a, a), (score_b, b)| {
            score_b
                .partial_cmp(score_a)
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    a.workload_ratio()
                        .partial_cmp(&b.workload_ratio())
                        .unwrap_or(Ordering::Equal)
                })
                .then_with(|| a.id.cmp(&b.id))
        });
        scored
            .into_iter()
            .map(|(_, technician)| technician.id.clone())
            .collect()
    }
}

#[async_trait]
impl Ranker for HeuristicRanker {
    async fn rank(
        &self,
        job: &AssignmentJob,
        candidates: &[TechnicianProfile],
    ) -> Result<Vec<TechnicianId>, RankError> {
        Ok(Self::ranking(job, candidates))
    }

    fn name(&self) -> &'static str {
        "heuristic ranker"
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Utc;
    use tiket_model::{Availability, TicketId};

    use super::*;

    fn technician(id: &str, tier: Tier, workload: u32, regions: &[&str]) -> TechnicianProfile {
        TechnicianProfile {
            id: TechnicianId::new(id).unwrap(),
            name: id.to_string(),
            document_id: String::new(),
            regions: regions.iter().map(|r| (*r).to_string()).collect(),
            skills: BTreeSet::new(),
            availability: Availability::Online,
            workload,
            max_workload: 4,
            projects: BTreeSet::new(),
            tier,
        }
    }

    fn job(priority: Priority, region: Option<&str>) -> AssignmentJob {
        AssignmentJob {
            ticket_id: TicketId::new("T-1").unwrap(),
            project_id: "proj-1".to_string(),
            region: region.map(str::to_string),
            required_skills: BTreeSet::new(),
            priority,
            requested_at: Utc::now(),
            identity_document: None,
        }
    }

    #[test]
    fn score_combines_weights() {
        let tech = technician("t-1", Tier::L2, 1, &["norte"]);
        let score = heuristic_score(&job(Priority::P1, Some("norte")), &tech);
        assert!((score - (1.2 * 0.9 * 0.75 + 0.1)).abs() < 1e-12);

        let score = heuristic_score(&job(Priority::P3, Some("sur")), &tech);
        assert!((score - 0.9 * 0.75).abs() < 1e-12);
    }

    #[test]
    fn spare_capacity_and_tier_lead_the_ranking() {
        let candidates = vec![
            technician("t-busy", Tier::L3, 3, &[]),
            technician("t-free", Tier::L3, 0, &[]),
            technician("t-junior", Tier::L1, 0, &[]),
        ];
        let ids = HeuristicRanker::ranking(&job(Priority::P2, None), &candidates);
        let ids: Vec<&str> = ids.iter().map(TechnicianId::as_str).collect();
        assert_eq!(ids, vec!["t-free", "t-junior", "t-busy"]);
    }

    #[test]
    fn ties_break_by_id() {
        let candidates = vec![
            technician("t-b", Tier::L2, 1, &[]),
            technician("t-a", Tier::L2, 1, &[]),
        ];
        let ids = HeuristicRanker::ranking(&job(Priority::P2, None), &candidates);
        assert_eq!(ids[0].as_str(), "t-a");
    }
}
