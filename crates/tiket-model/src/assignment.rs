//! Ticket assignment types.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{TechnicianId, TicketId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    P1,
    P2,
    P3,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Availability {
    Online,
    Offline,
    Busy,
}

/// Technician seniority; orders `L1 < L2 < L3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    L1,
    L2,
    L3,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L1 => "L1",
            Self::L2 => "L2",
            Self::L3 => "L3",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to assign a ticket to a technician.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentJob {
    pub ticket_id: TicketId,
    pub project_id: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub required_skills: BTreeSet<String>,
    pub priority: Priority,
    pub requested_at: DateTime<Utc>,
    /// Identity document of the customer, already normalized.
    #[serde(default)]
    pub identity_document: Option<String>,
}

/// Reference data for a technician. Never mutated by assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicianProfile {
    pub id: TechnicianId,
    pub name: String,
    #[serde(default)]
    pub document_id: String,
    #[serde(default)]
    pub regions: BTreeSet<String>,
    #[serde(default)]
    pub skills: BTreeSet<String>,
    pub availability: Availability,
    pub workload: u32,
    pub max_workload: u32,
    #[serde(default)]
    pub projects: BTreeSet<String>,
    pub tier: Tier,
}

impl TechnicianProfile {
    /// Current workload as a share of capacity; a zero capacity counts as full.
    pub fn workload_ratio(&self) -> f64 {
        if self.max_workload == 0 {
            1.0
        } else {
            f64::from(self.workload) / f64::from(self.max_workload)
        }
    }

    pub fn has_capacity(&self) -> bool {
        self.workload < self.max_workload
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssignmentStrategy {
    MlRanking,
    DeterministicFallback,
    HardStop,
}

impl AssignmentStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MlRanking => "ml-ranking",
            Self::DeterministicFallback => "deterministic-fallback",
            Self::HardStop => "hard-stop",
        }
    }
}

impl fmt::Display for AssignmentStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentDecision {
    pub ticket_id: TicketId,
    #[serde(default)]
    pub technician_id: Option<TechnicianId>,
    pub strategy: AssignmentStrategy,
    pub rationale: String,
    /// Technicians that passed the hard rules, in directory order.
    #[serde(default)]
    pub candidate_pool: Vec<TechnicianId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<String>>,
}

/// Process-wide engine counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentMetrics {
    pub enqueued: u64,
    pub processed: u64,
    pub ml_failures: u64,
    pub fallback_decisions: u64,
    pub hard_stops: u64,
    pub queue_depth: usize,
    pub last_batch_size: usize,
}
