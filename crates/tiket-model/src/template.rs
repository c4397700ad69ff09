//! Template matching results and the confirm-template decision.

use serde::{Deserialize, Serialize};

/// A scored template candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateMatch {
    pub template_id: String,
    pub template_version_id: String,
    /// Adjusted similarity score in `[0, 1]`, rounded to three decimals.
    pub score: f64,
}

/// Hint emitted when the artifact's fingerprint matches a known layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatUploadHint {
    pub fingerprint: String,
    /// Columns classified as dates, offered as already confirmed.
    #[serde(default)]
    pub confirmed_date_columns: Vec<String>,
    /// Questions the user still has to answer before reuse.
    #[serde(default)]
    pub required_prompts: Vec<String>,
    /// Whether the fingerprint's template is registered on the platform.
    pub exists_on_platform: bool,
    pub note: String,
}

/// Outcome of matching an artifact against the template catalog.
///
/// `strong_match` and `propose_new_template` are never both set by the
/// matcher; confirmation payloads asserting both are rejected downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSuggestionResult {
    #[serde(default)]
    pub strong_match: Option<TemplateMatch>,
    /// Candidates ordered by descending score.
    #[serde(default)]
    pub suggestions: Vec<TemplateMatch>,
    #[serde(default)]
    pub propose_new_template: bool,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub repeat_upload_hint: Option<RepeatUploadHint>,
    #[serde(default)]
    pub technician_summary: String,
    #[serde(default)]
    pub next_steps: Option<Vec<String>>,
}

impl TemplateSuggestionResult {
    /// True when neither a strong match nor a new template was decided and
    /// the user must pick from the ranked suggestions.
    pub fn requires_user_choice(&self) -> bool {
        self.strong_match.is_none() && !self.propose_new_template
    }
}

/// The confirm-template decision submitted by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfirmation {
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub template_version_id: Option<String>,
    #[serde(default)]
    pub strong_match: Option<TemplateMatch>,
    #[serde(default)]
    pub propose_new_template: bool,
}
