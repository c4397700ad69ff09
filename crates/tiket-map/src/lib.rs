//! Column classification and template matching.
//!
//! Column names are turned into lexical feature vectors, scored by a
//! fixed-weight classifier, and the resulting classifications are matched
//! against a catalog of known templates.

pub mod catalog;
pub mod classifier;
pub mod features;
pub mod fingerprint;
pub mod matcher;

pub use catalog::{BaselineTemplate, KnownFingerprint, TemplateCatalog};
pub use classifier::{
    ADDRESS_CONFIDENCE, FieldScores, PHOTO_CONFIDENCE, SCORED_TYPES, classify_column,
    classify_columns, score_features, score_field_types,
};
pub use features::{
    ExtractedFeatures, FEATURE_COUNT, FeatureVector, Signal, extract_features, tokenize,
};
pub use fingerprint::{FINGERPRINT_DELIMITER, fingerprint_digest, structural_fingerprint};
pub use matcher::{
    ArtifactSignals, CandidateScore, MatchThresholds, ScoreComponent, TemplateMatcher,
    match_templates,
};
