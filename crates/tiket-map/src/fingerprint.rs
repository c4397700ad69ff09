//! Structural fingerprint of a spreadsheet layout.

use sha2::{Digest, Sha256};
use tiket_model::StructuralArtifact;

/// Separator between fingerprint segments.
pub const FINGERPRINT_DELIMITER: &str = "|";

/// Builds the layout fingerprint.
///
/// Segments are the anchor hash, the formula fingerprint, then one segment
/// per table holding its lower-cased column names sorted and comma joined.
pub fn structural_fingerprint(artifact: &StructuralArtifact) -> String {
    let mut segments = vec![
        artifact.fingerprint.anchor_hash.clone(),
        artifact.fingerprint.formula_fingerprint.clone(),
    ];
    for table in &artifact.tables {
        let mut names: Vec<String> = table
            .columns
            .iter()
            .map(|column| column.name.trim().to_lowercase())
            .collect();
        names.sort();
        segments.push(names.join(","));
    }
    segments.join(FINGERPRINT_DELIMITER)
}

/// SHA-256 hex digest of a fingerprint, usable as a fixed-length storage key.
pub fn fingerprint_digest(fingerprint: &str) -> String {
    hex::encode(Sha256::digest(fingerprint.as_bytes()))
}
