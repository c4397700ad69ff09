//! Column type classifier.
//!
//! Photo and address columns are recognized by vocabulary alone. Every
//! other column goes through a fixed-weight two-layer network over the
//! lexical feature vector, followed by a stabilized softmax.

use tiket_model::{ColumnClassification, FieldType, StructuralArtifact};
use tracing::debug;

use crate::features::{
    ADDRESS_KEYWORDS, ExtractedFeatures, FEATURE_COUNT, FeatureVector, PHOTO_KEYWORDS,
    extract_features, matching_tokens,
};

/// Confidence attached to a photo keyword hit.
pub const PHOTO_CONFIDENCE: f64 = 0.93;
/// Confidence attached to an address keyword hit.
pub const ADDRESS_CONFIDENCE: f64 = 0.88;

const HIDDEN_UNITS: usize = 5;
const OUTPUT_UNITS: usize = 6;

/// Field types produced by the network, in output order.
pub const SCORED_TYPES: [FieldType; OUTPUT_UNITS] = [
    FieldType::Date,
    FieldType::Number,
    FieldType::Text,
    FieldType::Boolean,
    FieldType::Select,
    FieldType::Multiselect,
];

// Hidden units: temporal, quantity, descriptive, flag, choice.
// Input order: date, number, identity, count, location, boolean, text, length penalty.
const HIDDEN_WEIGHTS: [[f64; FEATURE_COUNT]; HIDDEN_UNITS] = [
    [2.2, -0.4, -0.3, -0.2, -0.3, -0.3, -0.2, -0.1],
    [-0.4, 2.0, -0.2, 1.6, -0.3, -0.3, -0.3, -0.2],
    [-0.3, -0.3, 1.4, -0.2, 0.6, -0.2, 1.8, 0.8],
    [-0.3, -0.3, -0.2, -0.2, -0.2, 2.1, -0.3, -0.2],
    [-0.2, -0.2, 0.3, 0.2, 1.6, 0.6, 0.4, -0.3],
];
const HIDDEN_BIAS: [f64; HIDDEN_UNITS] = [0.05, 0.05, 0.3, 0.0, 0.0];

const OUTPUT_WEIGHTS: [[f64; HIDDEN_UNITS]; OUTPUT_UNITS] = [
    [2.4, -0.5, -0.3, -0.4, -0.2],
    [-0.5, 2.4, -0.3, -0.4, -0.1],
    [-0.3, -0.3, 1.9, -0.3, 0.2],
    [-0.4, -0.4, -0.3, 2.4, 0.3],
    [-0.2, 0.1, 0.3, 0.4, 1.8],
    [-0.3, 0.1, 0.1, 0.2, 1.5],
];
const OUTPUT_BIAS: [f64; OUTPUT_UNITS] = [-0.2, -0.2, 0.4, -0.3, -0.4, -0.6];

/// Probability per scored field type. Always finite and summing to one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldScores([f64; OUTPUT_UNITS]);

impl FieldScores {
    fn uniform() -> Self {
        Self([1.0 / OUTPUT_UNITS as f64; OUTPUT_UNITS])
    }

    pub fn probability(&self, field_type: FieldType) -> Option<f64> {
        SCORED_TYPES
            .iter()
            .position(|t| *t == field_type)
            .map(|index| self.0[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldType, f64)> + '_ {
        SCORED_TYPES.iter().copied().zip(self.0.iter().copied())
    }

    pub fn as_array(&self) -> &[f64; OUTPUT_UNITS] {
        &self.0
    }

    /// Highest-probability type; ties go to the earlier type in output order.
    pub fn best(&self) -> (FieldType, f64) {
        let mut best = (SCORED_TYPES[0], self.0[0]);
        for (field_type, probability) in self.iter().skip(1) {
            if probability > best.1 {
                best = (field_type, probability);
            }
        }
        best
    }
}

fn relu(value: f64) -> f64 {
    value.max(0.0)
}

fn logits(features: &FeatureVector) -> [f64; OUTPUT_UNITS] {
    let input = features.as_array();

    let mut hidden = [0.0; HIDDEN_UNITS];
    for (unit, (weights, bias)) in HIDDEN_WEIGHTS.iter().zip(HIDDEN_BIAS).enumerate() {
        let sum: f64 = weights.iter().zip(input).map(|(w, x)| w * x).sum();
        hidden[unit] = relu(sum + bias);
    }

    let mut output = [0.0; OUTPUT_UNITS];
    for (unit, (weights, bias)) in OUTPUT_WEIGHTS.iter().zip(OUTPUT_BIAS).enumerate() {
        let sum: f64 = weights.iter().zip(&hidden).map(|(w, h)| w * h).sum();
        output[unit] = sum + bias;
    }
    output
}

/// Softmax with the max logit subtracted first.
///
/// Falls back to a uniform distribution when the input is degenerate.
fn softmax(logits: [f64; OUTPUT_UNITS]) -> FieldScores {
    if logits.iter().any(|v| !v.is_finite()) {
        return FieldScores::uniform();
    }
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut exps = logits.map(|v| (v - max).exp());
    let sum: f64 = exps.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        return FieldScores::uniform();
    }
    for value in &mut exps {
        *value /= sum;
    }
    // renormalize rounding drift
    let total: f64 = exps.iter().sum();
    if total > 0.0 && (total - 1.0).abs() > f64::EPSILON {
        for value in &mut exps {
            *value /= total;
        }
    }
    FieldScores(exps)
}

/// Scores a feature vector with the fixed network.
pub fn score_features(features: &FeatureVector) -> FieldScores {
    softmax(logits(features))
}

/// Scores a column name over the six network field types.
pub fn score_field_types(name: &str) -> FieldScores {
    score_features(&extract_features(name).vector)
}

fn token_list(tokens: &[String]) -> String {
    if tokens.is_empty() {
        "(none)".to_string()
    } else {
        tokens.join(", ")
    }
}

fn keyword_override(column: &str, features: &ExtractedFeatures) -> Option<ColumnClassification> {
    let overrides: [(FieldType, f64, &[&str]); 2] = [
        (FieldType::Photo, PHOTO_CONFIDENCE, PHOTO_KEYWORDS),
        (FieldType::Address, ADDRESS_CONFIDENCE, ADDRESS_KEYWORDS),
    ];
    overrides
        .into_iter()
        .find_map(|(field_type, confidence, keywords)| {
            let matched = matching_tokens(&features.tokens, keywords);
            (!matched.is_empty()).then(|| ColumnClassification {
                column: column.to_string(),
                field_type,
                confidence,
                evidence: vec![format!(
                    "{field_type} keywords matched: {}",
                    matched.join(", ")
                )],
            })
        })
}

/// Classifies one column by name.
pub fn classify_column(name: &str) -> ColumnClassification {
    let features = extract_features(name);
    if let Some(classification) = keyword_override(name, &features) {
        debug!(
            column = name,
            field_type = %classification.field_type,
            "keyword override"
        );
        return classification;
    }

    let scores = score_features(&features.vector);
    let (field_type, confidence) = scores.best();
    debug!(column = name, %field_type, confidence, "column scored");

    ColumnClassification {
        column: name.to_string(),
        field_type,
        confidence,
        evidence: vec![
            format!("{field_type} scored {confidence:.3}"),
            format!("tokens: {}", token_list(&features.tokens)),
        ],
    }
}

/// Classifies every column of every detected table, in artifact order.
pub fn classify_columns(artifact: &StructuralArtifact) -> Vec<ColumnClassification> {
    artifact
        .columns()
        .map(|column| classify_column(&column.name))
        .collect()
}
