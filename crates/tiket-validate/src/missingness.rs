//! Missingness profiling from the structural artifact.
//!
//! The profiler only looks at layout density: how many tables, anchors,
//! format groups and formulas the parser found, and how many columns the
//! tables carry. A dense, well-anchored layout is more likely to have
//! values missing at random; a sparse one is treated as not at random.

use tiket_ingest::column_missingness;
use tiket_model::{
    MissingnessDetectionResult, MissingnessProfile, MissingnessSignal, StructuralArtifact,
};
use tracing::debug;

const MULTI_TABLE_BASE: f64 = 0.2;
const SINGLE_TABLE_BASE: f64 = 0.12;
const ANCHOR_WEIGHT: f64 = 0.08;
const ANCHOR_CAP: usize = 3;
const FORMAT_GROUP_WEIGHT: f64 = 0.05;
const FORMAT_GROUP_CAP: usize = 5;
const FORMULA_BONUS: f64 = 0.08;

const MIN_CONFIDENCE: f64 = 0.35;
const MAX_CONFIDENCE: f64 = 0.95;
/// Below this confidence the signal is always MNAR.
const MNAR_CEILING: f64 = 0.5;
/// Above this confidence the signal is MAR.
const MAR_FLOOR: f64 = 0.72;
/// Minimum confidence for imputation.
const IMPUTATION_FLOOR: f64 = 0.58;
/// Fewer columns than this makes the layout sparse.
const SPARSE_COLUMNS: usize = 3;
/// Column empty share that earns a note.
const EMPTY_SHARE_NOTE: f64 = 0.5;

fn volume_boost(columns: usize) -> f64 {
    match columns {
        n if n >= 8 => 0.2,
        n if n >= 4 => 0.1,
        _ => 0.04,
    }
}

fn structural_density(artifact: &StructuralArtifact) -> f64 {
    let base = if artifact.tables.len() > 1 {
        MULTI_TABLE_BASE
    } else {
        SINGLE_TABLE_BASE
    };
    let anchors = artifact.anchors.len().min(ANCHOR_CAP) as f64 * ANCHOR_WEIGHT;
    let formats = artifact.format_groups.len().min(FORMAT_GROUP_CAP) as f64 * FORMAT_GROUP_WEIGHT;
    let formulas = if artifact.formula_occurrences() > 0 {
        FORMULA_BONUS
    } else {
        0.0
    };
    base + anchors + formats + formulas
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Profiles the missingness risk of an artifact.
pub fn detect_missingness(artifact: &StructuralArtifact) -> MissingnessDetectionResult {
    let columns = artifact.column_count();
    let density = structural_density(artifact);
    let boost = volume_boost(columns);
    let confidence = round2((density + boost).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE));
    let sparse = columns < SPARSE_COLUMNS || artifact.tables.is_empty();

    let signal = if confidence < MNAR_CEILING || sparse {
        MissingnessSignal::Mnar
    } else if confidence > MAR_FLOOR {
        MissingnessSignal::Mar
    } else {
        MissingnessSignal::Mcar
    };
    let imputation_permitted = signal != MissingnessSignal::Mnar && confidence >= IMPUTATION_FLOOR;

    let mut blockers = Vec::new();
    if signal == MissingnessSignal::Mnar {
        blockers.push("Missing values look not-at-random for this layout".to_string());
    }
    if !imputation_permitted {
        blockers.push(format!(
            "Imputation is disabled at confidence {confidence:.2} with signal {signal}"
        ));
    }
    if artifact.anchors.is_empty() {
        blockers.push("No anchor labels were detected to align rows".to_string());
    }
    if artifact.format_groups.len() <= 1 {
        blockers.push("At most one cell format group was detected".to_string());
    }

    let mut notes = vec![format!(
        "structural density {density:.2} with volume boost {boost:.2} over {columns} columns"
    )];
    if sparse {
        notes.push(format!(
            "sparse layout: {columns} columns across {} tables",
            artifact.tables.len()
        ));
    }
    for column in column_missingness(artifact) {
        if column.empty_ratio >= EMPTY_SHARE_NOTE {
            notes.push(format!(
                "column '{}' is empty in {:.0}% of {} sampled values",
                column.column,
                column.empty_ratio * 100.0,
                column.sample_count
            ));
        }
    }

    debug!(%signal, confidence, imputation_permitted, sparse, "missingness profiled");

    MissingnessDetectionResult {
        profile: MissingnessProfile {
            signal,
            confidence,
            imputation_permitted,
            blockers: (!blockers.is_empty()).then_some(blockers),
        },
        notes,
    }
}
