//! Error types for confirm-template decisions.

use thiserror::Error;

/// A confirm-template decision the user has to correct.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfirmationError {
    /// Both reuse and a new template were requested.
    #[error("decision both accepts a strong match and proposes a new template")]
    AmbiguousDecision {
        /// Template named by the strong match.
        template_id: String,
    },

    /// A template id was given without its version.
    #[error("template '{template_id}' was selected without a version")]
    MissingVersion { template_id: String },

    /// Neither a template nor a new template was chosen.
    #[error("decision selects no template and does not propose a new one")]
    NothingSelected,
}

impl ConfirmationError {
    /// A user-facing hint for correcting the decision.
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::AmbiguousDecision { .. } => {
                "Either keep the suggested template or propose a new one, not both."
            }
            Self::MissingVersion { .. } => {
                "Pick a specific version of the template from the suggestion list."
            }
            Self::NothingSelected => {
                "Choose one of the ranked suggestions or propose a new template."
            }
        }
    }
}

/// Result type for confirmation checks.
pub type Result<T> = std::result::Result<T, ConfirmationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_template() {
        let err = ConfirmationError::MissingVersion {
            template_id: "tpl-a".to_string(),
        };
        assert_eq!(err.to_string(), "template 'tpl-a' was selected without a version");
        assert!(err.suggestion().contains("version"));
    }
}
