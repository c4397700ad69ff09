//! Deterministic fallback when ranking is unavailable.

use tiket_model::{AssignmentJob, TechnicianProfile};

/// Picks a technician without the ranker.
///
/// Must return a candidate whenever `candidates` is non-empty.
pub trait FallbackSelector: Send + Sync {
    fn select<'a>(
        &self,
        job: &AssignmentJob,
        candidates: &'a [TechnicianProfile],
    ) -> Option<&'a TechnicianProfile>;
}

/// Lowest workload first, then tier (`L1` before `L3`), then id.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastLoadedSelector;

impl FallbackSelector for LeastLoadedSelector {
    fn select<'a>(
        &self,
        _job: &AssignmentJob,
        candidates: &'a [TechnicianProfile],
    ) -> Option<&'a TechnicianProfile> {
        candidates.iter().min_by(|a, b| {
            a.workload
                .cmp(&b.workload)
                .then_with(|| a.tier.cmp(&b.tier))
                .then_with(|| a.id.cmp(&b.id))
        })
    }
}
