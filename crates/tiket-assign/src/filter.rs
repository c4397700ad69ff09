//! Hard assignment rules.
//!
//! A technician is eligible for a job only when every rule passes. The
//! rules are checked in a fixed order and the first failing one is reported.

use std::collections::BTreeMap;
use std::fmt;

use tiket_model::{AssignmentJob, Availability, TechnicianProfile};

/// The first hard rule a technician fails for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Exclusion {
    Offline,
    AtCapacity,
    ProjectNotSupported,
    RegionMismatch,
    MissingSkills,
}

impl Exclusion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::AtCapacity => "at capacity",
            Self::ProjectNotSupported => "project not supported",
            Self::RegionMismatch => "region mismatch",
            Self::MissingSkills => "missing skills",
        }
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks every hard rule for one technician.
pub fn check_eligibility(
    technician: &TechnicianProfile,
    job: &AssignmentJob,
) -> Result<(), Exclusion> {
    if technician.availability == Availability::Offline {
        return Err(Exclusion::Offline);
    }
    if !technician.has_capacity() {
        return Err(Exclusion::AtCapacity);
    }
    if !technician.projects.contains(&job.project_id) {
        return Err(Exclusion::ProjectNotSupported);
    }
    if let Some(region) = &job.region
        && !technician.regions.contains(region)
    {
        return Err(Exclusion::RegionMismatch);
    }
    if !job.required_skills.is_subset(&technician.skills) {
        return Err(Exclusion::MissingSkills);
    }
    Ok(())
}

/// Eligible technicians in directory order, plus a count of exclusions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidatePool {
    pub candidates: Vec<TechnicianProfile>,
    pub exclusions: BTreeMap<Exclusion, usize>,
}

impl CandidatePool {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// One line per exclusion reason, e.g. `"2 at capacity"`.
    pub fn exclusion_notes(&self) -> Vec<String> {
        self.exclusions
            .iter()
            .map(|(reason, count)| format!("{count} {reason}"))
            .collect()
    }
}

/// Applies the hard rules to every technician.
pub fn candidate_pool(job: &AssignmentJob, technicians: &[TechnicianProfile]) -> CandidatePool {
    let mut pool = CandidatePool::default();
    for technician in technicians {
        match check_eligibility(technician, job) {
            Ok(()) => pool.candidates.push(technician.clone()),
            Err(reason) => *pool.exclusions.entry(reason).or_default() += 1,
        }
    }
    pool
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Utc;
    use tiket_model::{Priority, TechnicianId, Tier, TicketId};

    use super::*;

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    fn technician(id: &str) -> TechnicianProfile {
        TechnicianProfile {
            id: TechnicianId::new(id).unwrap(),
            name: id.to_string(),
            document_id: String::new(),
            regions: set(&["norte"]),
            skills: set(&["fibra", "cobre"]),
            availability: Availability::Online,
            workload: 1,
            max_workload: 4,
            projects: set(&["proj-1"]),
            tier: Tier::L2,
        }
    }

    fn job() -> AssignmentJob {
        AssignmentJob {
            ticket_id: TicketId::new("T-1").unwrap(),
            project_id: "proj-1".to_string(),
            region: Some("norte".to_string()),
            required_skills: set(&["fibra"]),
            priority: Priority::P2,
            requested_at: Utc::now(),
            identity_document: None,
        }
    }

    #[test]
    fn eligible_technician_passes_every_rule() {
        assert_eq!(check_eligibility(&technician("t-1"), &job()), Ok(()));
    }

    #[test]
    fn busy_technicians_are_still_eligible() {
        let mut busy = technician("t-1");
        busy.availability = Availability::Busy;
        assert_eq!(check_eligibility(&busy, &job()), Ok(()));
    }

    #[test]
    fn first_failing_rule_is_reported() {
        let mut offline = technician("t-1");
        offline.availability = Availability::Offline;
        offline.workload = 4;
        assert_eq!(check_eligibility(&offline, &job()), Err(Exclusion::Offline));

        let mut full = technician("t-2");
        full.workload = 4;
        assert_eq!(check_eligibility(&full, &job()), Err(Exclusion::AtCapacity));

        let mut elsewhere = technician("t-3");
        elsewhere.regions = set(&["sur"]);
        assert_eq!(
            check_eligibility(&elsewhere, &job()),
            Err(Exclusion::RegionMismatch)
        );

        let mut job = job();
        job.required_skills = set(&["fibra", "radio"]);
        assert_eq!(
            check_eligibility(&technician("t-4"), &job),
            Err(Exclusion::MissingSkills)
        );
    }

    #[test]
    fn no_region_means_any_region() {
        let mut job = job();
        job.region = None;
        let mut elsewhere = technician("t-1");
        elsewhere.regions.clear();
        assert_eq!(check_eligibility(&elsewhere, &job), Ok(()));
    }

    #[test]
    fn pool_counts_exclusions() {
        let mut full = technician("t-2");
        full.workload = 4;
        let mut other_project = technician("t-3");
        other_project.projects = set(&["proj-9"]);
        let pool = candidate_pool(&job(), &[technician("t-1"), full, other_project]);
        assert_eq!(pool.candidates.len(), 1);
        assert_eq!(
            pool.exclusion_notes(),
            vec!["1 at capacity".to_string(), "1 project not supported".to_string()]
        );
    }
}
