//! Template catalog: baseline candidates and known layouts.

use serde::{Deserialize, Serialize};

/// A template candidate with its score before adjustments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineTemplate {
    pub template_id: String,
    pub template_version_id: String,
    pub base_score: f64,
}

impl BaselineTemplate {
    pub fn new(
        template_id: impl Into<String>,
        template_version_id: impl Into<String>,
        base_score: f64,
    ) -> Self {
        Self {
            template_id: template_id.into(),
            template_version_id: template_version_id.into(),
            base_score,
        }
    }
}

/// A layout seen before, recognized by a fingerprint prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownFingerprint {
    pub prefix: String,
    pub template_id: String,
    pub template_version_id: String,
}

impl KnownFingerprint {
    pub fn new(
        prefix: impl Into<String>,
        template_id: impl Into<String>,
        template_version_id: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            template_id: template_id.into(),
            template_version_id: template_version_id.into(),
        }
    }

    pub fn is_for(&self, template_id: &str, template_version_id: &str) -> bool {
        self.template_id == template_id && self.template_version_id == template_version_id
    }
}

/// Baseline candidates plus the known-fingerprint registry.
///
/// Loadable from JSON; missing sections fall back to empty lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateCatalog {
    #[serde(default)]
    pub baselines: Vec<BaselineTemplate>,
    #[serde(default)]
    pub known_fingerprints: Vec<KnownFingerprint>,
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self {
            baselines: vec![
                BaselineTemplate::new("tpl-field-service", "tpl-field-service-v3", 0.80),
                BaselineTemplate::new("tpl-installations", "tpl-installations-v2", 0.74),
                BaselineTemplate::new("tpl-maintenance", "tpl-maintenance-v1", 0.68),
            ],
            known_fingerprints: vec![
                KnownFingerprint::new("anc-fs01", "tpl-field-service", "tpl-field-service-v3"),
                KnownFingerprint::new("anc-in02", "tpl-installations", "tpl-installations-v2"),
                KnownFingerprint::new(
                    "anc-legacy9",
                    "tpl-legacy-survey",
                    "tpl-legacy-survey-v1",
                ),
            ],
        }
    }
}

impl TemplateCatalog {
    pub fn empty() -> Self {
        Self {
            baselines: Vec::new(),
            known_fingerprints: Vec::new(),
        }
    }

    /// Registry entry whose prefix starts the fingerprint.
    ///
    /// Empty prefixes never match; the longest matching prefix wins.
    pub fn lookup(&self, fingerprint: &str) -> Option<&KnownFingerprint> {
        self.known_fingerprints
            .iter()
            .filter(|known| !known.prefix.is_empty() && fingerprint.starts_with(&known.prefix))
            .max_by_key(|known| known.prefix.len())
    }

    /// Whether a template id appears among the baseline candidates.
    pub fn is_registered(&self, template_id: &str) -> bool {
        self.baselines
            .iter()
            .any(|baseline| baseline.template_id == template_id)
    }
}
