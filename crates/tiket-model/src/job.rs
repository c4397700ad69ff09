//! Snapshot of an import job as maintained by the persistence layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::artifact::StructuralArtifact;
use crate::missingness::MissingnessProfile;
use crate::template::TemplateSuggestionResult;

/// The template version the user confirmed for the job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateResolution {
    pub template_id: String,
    pub template_version_id: String,
    #[serde(default)]
    pub confirmed_at: Option<DateTime<Utc>>,
}

/// Result of looking for the point-of-service column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosDetection {
    /// Column the detector settled on, if any.
    #[serde(default)]
    pub column: Option<String>,
    /// The selected template requires a POS value.
    #[serde(default)]
    pub required: bool,
    /// No usable POS value was found.
    #[serde(default)]
    pub missing: bool,
}

impl PosDetection {
    pub fn is_required_and_missing(&self) -> bool {
        self.required && self.missing
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeolocationCheck {
    pub ok: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Insights stored on the job by the preview step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MlInsights {
    #[serde(default)]
    pub template_suggestion: Option<TemplateSuggestionResult>,
    #[serde(default)]
    pub missingness: Option<MissingnessProfile>,
    #[serde(default)]
    pub pos_detection: Option<PosDetection>,
    #[serde(default)]
    pub geolocation: Option<GeolocationCheck>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportJob {
    pub id: String,
    #[serde(default)]
    pub structure: Option<StructuralArtifact>,
    #[serde(default)]
    pub template_resolution: Option<TemplateResolution>,
    #[serde(default)]
    pub ml_insights: Option<MlInsights>,
    /// Reference to the error file left by a previous run.
    #[serde(default)]
    pub errors_ref: Option<String>,
}

impl ImportJob {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}
