//! Checks on the confirm-template decision before it reaches the job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tiket_model::{TemplateConfirmation, TemplateResolution};
use tracing::debug;

use crate::error::{ConfirmationError, Result};

/// An accepted confirm-template decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ConfirmedTemplate {
    Existing {
        template_id: String,
        template_version_id: String,
    },
    ProposeNew,
}

impl ConfirmedTemplate {
    /// Template resolution to store on the job; `None` for a new template,
    /// which still has to be created.
    pub fn to_resolution(&self, confirmed_at: DateTime<Utc>) -> Option<TemplateResolution> {
        match self {
            Self::Existing {
                template_id,
                template_version_id,
            } => Some(TemplateResolution {
                template_id: template_id.clone(),
                template_version_id: template_version_id.clone(),
                confirmed_at: Some(confirmed_at),
            }),
            Self::ProposeNew => None,
        }
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Validates a confirm-template decision.
///
/// A decision asserting both a strong match and a new template is rejected,
/// never resolved in favour of either side. Explicit ids win over the
/// strong match.
pub fn validate_confirmation(decision: &TemplateConfirmation) -> Result<ConfirmedTemplate> {
    if decision.propose_new_template {
        if let Some(strong) = &decision.strong_match {
            return Err(ConfirmationError::AmbiguousDecision {
                template_id: strong.template_id.clone(),
            });
        }
        return Ok(ConfirmedTemplate::ProposeNew);
    }

    let template_id = non_blank(decision.template_id.as_ref());
    let version_id = non_blank(decision.template_version_id.as_ref());
    let strong = decision.strong_match.as_ref();

    let confirmed = match (template_id, version_id, strong) {
        (Some(id), Some(version), _) => ConfirmedTemplate::Existing {
            template_id: id.to_string(),
            template_version_id: version.to_string(),
        },
        (Some(id), None, Some(m)) if m.template_id == id => ConfirmedTemplate::Existing {
            template_id: m.template_id.clone(),
            template_version_id: m.template_version_id.clone(),
        },
        (Some(id), None, _) => {
            return Err(ConfirmationError::MissingVersion {
                template_id: id.to_string(),
            });
        }
        (None, _, Some(m)) => ConfirmedTemplate::Existing {
            template_id: m.template_id.clone(),
            template_version_id: m.template_version_id.clone(),
        },
        (None, _, None) => return Err(ConfirmationError::NothingSelected),
    };
    debug!(?confirmed, "template decision accepted");
    Ok(confirmed)
}
