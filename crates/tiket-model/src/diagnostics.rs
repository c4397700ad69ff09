//! Diagnostic issue types produced by the diagnostics gate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Issue level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
    /// Blocks the import from running
    Error,
    /// Should be reviewed, does not block
    Warning,
}

impl IssueLevel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }

    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Error)
    }
}

/// Stable issue codes, in gate evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueCode {
    MissingStructure,
    TemplateNotConfirmed,
    NewTemplateProposed,
    MissingnessMnar,
    MlInsightsMissing,
    PosMissing,
    PosRequired,
    GeolocationBlocked,
    MissingnessBlocked,
    PreviousErrors,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingStructure => "missing-structure",
            Self::TemplateNotConfirmed => "template-not-confirmed",
            Self::NewTemplateProposed => "new-template-proposed",
            Self::MissingnessMnar => "missingness-mnar",
            Self::MlInsightsMissing => "ml-insights-missing",
            Self::PosMissing => "pos-missing",
            Self::PosRequired => "pos-required",
            Self::GeolocationBlocked => "geolocation-blocked",
            Self::MissingnessBlocked => "missingness-blocked",
            Self::PreviousErrors => "previous-errors",
        }
    }

    /// Level attached to every issue carrying this code.
    pub fn level(&self) -> IssueLevel {
        match self {
            Self::MissingStructure | Self::NewTemplateProposed | Self::PreviousErrors => {
                IssueLevel::Warning
            }
            _ => IssueLevel::Error,
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticIssue {
    pub level: IssueLevel,
    pub code: IssueCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl DiagnosticIssue {
    /// Builds an issue whose level follows from its code.
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            level: code.level(),
            code,
            message: message.into(),
            recommendation: None,
        }
    }

    #[must_use]
    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDiagnostics {
    pub job_id: String,
    pub ready_to_run: bool,
    pub issues: Vec<DiagnosticIssue>,
}

impl JobDiagnostics {
    /// Builds diagnostics, deriving `ready_to_run` from the issue levels.
    pub fn from_issues(job_id: impl Into<String>, issues: Vec<DiagnosticIssue>) -> Self {
        let ready_to_run = !issues.iter().any(|issue| issue.level.is_blocking());
        Self {
            job_id: job_id.into(),
            ready_to_run,
            issues,
        }
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.level == IssueLevel::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.level == IssueLevel::Warning)
            .count()
    }

    pub fn has_code(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|issue| issue.code == code)
    }
}
