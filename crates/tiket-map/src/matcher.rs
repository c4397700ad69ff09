//! Template matching against the catalog.
//!
//! Every baseline candidate starts from its catalog score and is adjusted by
//! signals taken from the column classifications and the layout fingerprint.
//! Each adjustment is kept as a [`ScoreComponent`] so the rationale shown to
//! the user can name what moved the score.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tiket_model::{
    ColumnClassification, FieldType, RepeatUploadHint, StructuralArtifact, TemplateMatch,
    TemplateSuggestionResult,
};
use tracing::debug;

use crate::catalog::{BaselineTemplate, KnownFingerprint, TemplateCatalog};
use crate::fingerprint::structural_fingerprint;

const SCHEMA_SIGNAL_BONUS: f64 = 0.06;
const LOW_CONFIDENCE_PENALTY: f64 = 0.08;
const TYPE_VARIETY_BONUS: f64 = 0.03;
const KNOWN_LAYOUT_BONUS: f64 = 0.12;
/// Distinct inferred types needed for the variety bonus.
const TYPE_VARIETY_MIN: usize = 4;
/// Schema-typed columns needed for the strong schema signal.
const SCHEMA_COLUMNS_MIN: usize = 2;
const SCORE_CEILING: f64 = 0.99;

/// Score thresholds used by the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchThresholds {
    /// Minimum score for reuse without asking the user.
    pub strong_match: f64,
    /// Below this for every candidate, a new template is proposed.
    pub propose_new: f64,
    /// Average confidence above which the schema signal can fire.
    pub schema_signal_confidence: f64,
    /// Average confidence below which every candidate is penalized.
    pub low_confidence: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            strong_match: 0.85,
            propose_new: 0.70,
            schema_signal_confidence: 0.62,
            low_confidence: 0.45,
        }
    }
}

/// A component contributing to a candidate score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreComponent {
    pub name: &'static str,
    /// Signed contribution; penalties are negative.
    pub value: f64,
    pub description: String,
}

/// Adjusted score for one catalog candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    pub template_id: String,
    pub template_version_id: String,
    /// Clamped to the ceiling and rounded to three decimals.
    pub score: f64,
    pub components: Vec<ScoreComponent>,
}

impl CandidateScore {
    /// Human-readable breakdown of the score.
    pub fn explain(&self) -> String {
        self.components
            .iter()
            .map(|c| format!("{} {:+.2}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn to_match(&self) -> TemplateMatch {
        TemplateMatch {
            template_id: self.template_id.clone(),
            template_version_id: self.template_version_id.clone(),
            score: self.score,
        }
    }
}

/// Signals the matcher derives from an artifact and its classifications.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactSignals {
    pub average_confidence: f64,
    /// Columns typed as date, number or text.
    pub schema_columns: usize,
    pub distinct_types: usize,
    pub strong_schema_signal: bool,
    pub fingerprint: String,
}

impl ArtifactSignals {
    pub fn collect(
        artifact: &StructuralArtifact,
        classifications: &[ColumnClassification],
        thresholds: &MatchThresholds,
    ) -> Self {
        let average_confidence = if classifications.is_empty() {
            0.0
        } else {
            classifications.iter().map(|c| c.confidence).sum::<f64>()
                / classifications.len() as f64
        };
        let schema_columns = classifications
            .iter()
            .filter(|c| c.field_type.is_schema_type())
            .count();
        let distinct_types = classifications
            .iter()
            .map(|c| c.field_type)
            .collect::<BTreeSet<FieldType>>()
            .len();
        let strong_schema_signal = schema_columns >= SCHEMA_COLUMNS_MIN
            && average_confidence > thresholds.schema_signal_confidence;

        Self {
            average_confidence,
            schema_columns,
            distinct_types,
            strong_schema_signal,
            fingerprint: structural_fingerprint(artifact),
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Scores catalog candidates and decides between reuse, choice and a new template.
#[derive(Debug, Clone, Default)]
pub struct TemplateMatcher {
    catalog: TemplateCatalog,
    thresholds: MatchThresholds,
}

impl TemplateMatcher {
    pub fn new(catalog: TemplateCatalog) -> Self {
        Self {
            catalog,
            thresholds: MatchThresholds::default(),
        }
    }

    #[must_use]
    pub fn with_thresholds(mut self, thresholds: MatchThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn thresholds(&self) -> &MatchThresholds {
        &self.thresholds
    }

    fn score_candidate(
        &self,
        baseline: &BaselineTemplate,
        signals: &ArtifactSignals,
        known: Option<&KnownFingerprint>,
    ) -> CandidateScore {
        let mut components = vec![ScoreComponent {
            name: "baseline",
            value: baseline.base_score,
            description: "catalog score".to_string(),
        }];

        if signals.strong_schema_signal {
            components.push(ScoreComponent {
                name: "schema signal",
                value: SCHEMA_SIGNAL_BONUS,
                description: format!(
                    "{} schema columns at average confidence {:.2}",
                    signals.schema_columns, signals.average_confidence
                ),
            });
        }
        if signals.average_confidence < self.thresholds.low_confidence {
            components.push(ScoreComponent {
                name: "low confidence",
                value: -LOW_CONFIDENCE_PENALTY,
                description: format!(
                    "average confidence {:.2} below {:.2}",
                    signals.average_confidence, self.thresholds.low_confidence
                ),
            });
        }
        if signals.distinct_types >= TYPE_VARIETY_MIN {
            components.push(ScoreComponent {
                name: "type variety",
                value: TYPE_VARIETY_BONUS,
                description: format!("{} distinct field types", signals.distinct_types),
            });
        }
        if known.is_some_and(|k| k.is_for(&baseline.template_id, &baseline.template_version_id)) {
            components.push(ScoreComponent {
                name: "known layout",
                value: KNOWN_LAYOUT_BONUS,
                description: "fingerprint matches a previous upload".to_string(),
            });
        }

        let raw: f64 = components.iter().map(|c| c.value).sum();
        let score = round3(raw.clamp(0.0, SCORE_CEILING));
        debug!(
            template = %baseline.template_id,
            score,
            adjustments = components.len() - 1,
            "candidate scored"
        );

        CandidateScore {
            template_id: baseline.template_id.clone(),
            template_version_id: baseline.template_version_id.clone(),
            score,
            components,
        }
    }

    /// Scores every baseline candidate, best first.
    ///
    /// Equal scores are ordered by template id.
    pub fn score_candidates(
        &self,
        signals: &ArtifactSignals,
        known: Option<&KnownFingerprint>,
    ) -> Vec<CandidateScore> {
        let mut candidates: Vec<CandidateScore> = self
            .catalog
            .baselines
            .iter()
            .map(|baseline| self.score_candidate(baseline, signals, known))
            .collect();
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.template_id.cmp(&b.template_id))
        });
        candidates
    }

    /// Matches an artifact and its classifications against the catalog.
    pub fn suggest(
        &self,
        artifact: &StructuralArtifact,
        classifications: &[ColumnClassification],
    ) -> TemplateSuggestionResult {
        let signals = ArtifactSignals::collect(artifact, classifications, &self.thresholds);
        let known = self.catalog.lookup(&signals.fingerprint);
        let candidates = self.score_candidates(&signals, known);

        let fingerprint_match = known.and_then(|k| {
            candidates
                .iter()
                .find(|c| k.is_for(&c.template_id, &c.template_version_id))
        });
        let strong = fingerprint_match.or_else(|| {
            candidates
                .first()
                .filter(|c| c.score >= self.thresholds.strong_match)
        });
        let propose_new_template =
            strong.is_none() && candidates.iter().all(|c| c.score < self.thresholds.propose_new);
        let selected = strong.or_else(|| candidates.first());
        let outcome = Outcome::from_flags(strong.is_some(), propose_new_template);

        debug!(
            fingerprint = %signals.fingerprint,
            known_layout = known.is_some(),
            outcome = outcome.as_str(),
            "template match decided"
        );

        TemplateSuggestionResult {
            strong_match: strong.map(CandidateScore::to_match),
            suggestions: candidates.iter().map(CandidateScore::to_match).collect(),
            propose_new_template,
            rationale: self.rationale(outcome, selected),
            repeat_upload_hint: known
                .map(|k| self.repeat_upload_hint(k, &signals.fingerprint, classifications)),
            technician_summary: technician_summary(outcome, selected, classifications.len()),
            next_steps: Some(next_steps(outcome, selected)),
        }
    }

    fn rationale(&self, outcome: Outcome, selected: Option<&CandidateScore>) -> String {
        let Some(candidate) = selected else {
            return "No template candidates are configured".to_string();
        };
        let headline = match outcome {
            Outcome::Strong => format!(
                "Strong match on {} ({})",
                candidate.template_id, candidate.template_version_id
            ),
            Outcome::ProposeNew => format!(
                "No candidate reached {:.2}; closest was {}",
                self.thresholds.propose_new, candidate.template_id
            ),
            Outcome::Ambiguous => format!(
                "Closest candidate {} is between {:.2} and {:.2}",
                candidate.template_id, self.thresholds.propose_new, self.thresholds.strong_match
            ),
        };
        format!(
            "{headline}: score {:.3} ({})",
            candidate.score,
            candidate.explain()
        )
    }

    fn repeat_upload_hint(
        &self,
        known: &KnownFingerprint,
        fingerprint: &str,
        classifications: &[ColumnClassification],
    ) -> RepeatUploadHint {
        let exists_on_platform = self.catalog.is_registered(&known.template_id);
        let confirmed_date_columns: Vec<String> = classifications
            .iter()
            .filter(|c| c.field_type == FieldType::Date)
            .map(|c| c.column.clone())
            .collect();

        let mut required_prompts =
            vec!["Confirm this file follows the layout of the previous upload".to_string()];
        if confirmed_date_columns.is_empty() {
            required_prompts.push("Select the column that holds the service date".to_string());
        }
        if !exists_on_platform {
            required_prompts.push(format!(
                "Register template {} before reusing this layout",
                known.template_id
            ));
        }

        let note = if exists_on_platform {
            format!(
                "Layout seen before; template {} ({}) is registered on the platform",
                known.template_id, known.template_version_id
            )
        } else {
            format!(
                "Layout seen before, but template {} is not registered on the platform",
                known.template_id
            )
        };

        RepeatUploadHint {
            fingerprint: fingerprint.to_string(),
            confirmed_date_columns,
            required_prompts,
            exists_on_platform,
            note,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Strong,
    ProposeNew,
    Ambiguous,
}

impl Outcome {
    fn from_flags(strong: bool, propose_new: bool) -> Self {
        match (strong, propose_new) {
            (true, _) => Self::Strong,
            (false, true) => Self::ProposeNew,
            (false, false) => Self::Ambiguous,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::ProposeNew => "propose-new",
            Self::Ambiguous => "ambiguous",
        }
    }
}

fn technician_summary(
    outcome: Outcome,
    selected: Option<&CandidateScore>,
    column_count: usize,
) -> String {
    match (outcome, selected) {
        (Outcome::Strong, Some(c)) => format!(
            "This upload matches template {} (version {}); {column_count} columns can reuse its mapping.",
            c.template_id, c.template_version_id
        ),
        (Outcome::Ambiguous, Some(c)) => format!(
            "Template {} is the closest fit at {:.0}%; confirm it or pick another suggestion.",
            c.template_id,
            c.score * 100.0
        ),
        _ => format!(
            "This layout does not match an existing template; a new one will be built from {column_count} columns."
        ),
    }
}

fn next_steps(outcome: Outcome, selected: Option<&CandidateScore>) -> Vec<String> {
    match (outcome, selected) {
        (Outcome::Strong, Some(c)) => vec![
            format!("Confirm template {} to reuse its mapping", c.template_id),
            "Run diagnostics before importing".to_string(),
        ],
        (Outcome::Ambiguous, _) => vec![
            "Review the ranked suggestions".to_string(),
            "Choose a template explicitly or propose a new one".to_string(),
        ],
        _ => vec![
            "Create a new template from the detected columns".to_string(),
            "Review the inferred field types before saving the template".to_string(),
        ],
    }
}

/// Matches against the built-in catalog with default thresholds.
pub fn match_templates(
    artifact: &StructuralArtifact,
    classifications: &[ColumnClassification],
) -> TemplateSuggestionResult {
    TemplateMatcher::default().suggest(artifact, classifications)
}
