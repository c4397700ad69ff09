//! Shared data model for the ticket-import decision pipeline.
//!
//! Every type here crosses a crate or process boundary, so all of them are
//! serde-serializable with snake_case fields and the labels used by the
//! surrounding system (`"MNAR"`, `"hard-stop"`, `"template-not-confirmed"`).

pub mod artifact;
pub mod assignment;
pub mod classification;
pub mod diagnostics;
pub mod error;
pub mod ids;
pub mod job;
pub mod missingness;
pub mod template;

pub use artifact::{Anchor, CompressedFingerprint, DetectedTable, StructuralArtifact, TableColumn};
pub use assignment::{
    AssignmentDecision, AssignmentJob, AssignmentMetrics, AssignmentStrategy, Availability,
    Priority, TechnicianProfile, Tier,
};
pub use classification::{ColumnClassification, FieldType};
pub use diagnostics::{DiagnosticIssue, IssueCode, IssueLevel, JobDiagnostics};
pub use error::{ModelError, Result};
pub use ids::{TechnicianId, TicketId, normalize_document};
pub use job::{GeolocationCheck, ImportJob, MlInsights, PosDetection, TemplateResolution};
pub use missingness::{MissingnessDetectionResult, MissingnessProfile, MissingnessSignal};
pub use template::{
    RepeatUploadHint, TemplateConfirmation, TemplateMatch, TemplateSuggestionResult,
};
