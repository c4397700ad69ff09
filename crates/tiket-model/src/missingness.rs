use std::fmt;

use serde::{Deserialize, Serialize};

/// Risk tier for filling in absent values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissingnessSignal {
    /// Missing completely at random.
    #[serde(rename = "MCAR")]
    Mcar,
    /// Missing at random.
    #[serde(rename = "MAR")]
    Mar,
    /// Missing not at random; never safe to impute.
    #[serde(rename = "MNAR")]
    Mnar,
}

impl MissingnessSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mcar => "MCAR",
            Self::Mar => "MAR",
            Self::Mnar => "MNAR",
        }
    }
}

impl fmt::Display for MissingnessSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingnessProfile {
    pub signal: MissingnessSignal,
    pub confidence: f64,
    pub imputation_permitted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockers: Option<Vec<String>>,
}

impl MissingnessProfile {
    /// Blockers as a slice; empty when none were recorded.
    pub fn blockers(&self) -> &[String] {
        self.blockers.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingnessDetectionResult {
    pub profile: MissingnessProfile,
    #[serde(default)]
    pub notes: Vec<String>,
}
