//! Column header normalization.

use std::collections::{BTreeMap, BTreeSet};

use tiket_model::StructuralArtifact;

/// Creates stable, non-empty headers and disambiguates duplicates.
///
/// Blank headers become `col_<n>` (1-based position). A header that is already
/// taken gets the smallest `__<k>` suffix (k >= 1) that yields an unused name,
/// so the output never repeats, even when the input spells out a suffix itself.
pub fn normalize_header_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut used: BTreeSet<String> = BTreeSet::new();
    let mut next_suffix: BTreeMap<String, usize> = BTreeMap::new();
    let mut normalized = Vec::with_capacity(names.len());

    for (idx, raw) in names.iter().enumerate() {
        let trimmed = raw.as_ref().trim();
        let base = if trimmed.is_empty() {
            format!("col_{}", idx + 1)
        } else {
            trimmed.to_string()
        };

        let label = if used.contains(&base) {
            let suffix = next_suffix.entry(base.clone()).or_insert(1);
            while used.contains(&format!("{base}__{suffix}")) {
                *suffix += 1;
            }
            let label = format!("{base}__{suffix}");
            *suffix += 1;
            label
        } else {
            base
        };
        used.insert(label.clone());
        normalized.push(label);
    }

    normalized
}

/// Returns a copy of the artifact with every table's headers normalized.
pub fn normalize_headers(artifact: &StructuralArtifact) -> StructuralArtifact {
    let mut out = artifact.clone();
    for table in &mut out.tables {
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        let normalized = normalize_header_names(&names);
        for (column, name) in table.columns.iter_mut().zip(normalized) {
            column.name = name;
        }
    }
    out
}
