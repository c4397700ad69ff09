use std::path::PathBuf;

use serde::Serialize;

use tiket_ingest::{ColumnProfile, PatternSignals};
use tiket_model::{
    AssignmentDecision, AssignmentJob, AssignmentMetrics, ColumnClassification,
    MissingnessDetectionResult, TemplateSuggestionResult,
};

/// Everything `preview` learned about one artifact.
#[derive(Debug, Serialize)]
pub struct ArtifactPreview {
    pub path: PathBuf,
    pub fingerprint_digest: String,
    pub classifications: Vec<ColumnClassification>,
    pub suggestion: TemplateSuggestionResult,
    pub missingness: MissingnessDetectionResult,
    pub column_signals: Vec<ColumnSignals>,
}

#[derive(Debug, Serialize)]
pub struct ColumnSignals {
    pub column: String,
    pub sample_count: usize,
    #[serde(flatten)]
    pub signals: PatternSignals,
    #[serde(flatten)]
    pub profile: ColumnProfile,
}

/// Outcome of an `assign` run.
#[derive(Debug, Serialize)]
pub struct AssignmentRun {
    /// Decisions in request order.
    pub decisions: Vec<AssignmentDecision>,
    pub metrics: AssignmentMetrics,
    /// Requests still buffered at shutdown.
    pub abandoned: Vec<AssignmentJob>,
}

impl AssignmentRun {
    pub fn has_hard_stops(&self) -> bool {
        self.metrics.hard_stops > 0
    }
}
