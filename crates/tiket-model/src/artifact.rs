//! Structural artifact produced by the spreadsheet-parsing service.
//!
//! The artifact is created once per import job and never mutated by the
//! decision pipeline. Every field defaults when absent so partially
//! populated artifacts still deserialize.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A column detected inside a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableColumn {
    /// Header text as detected by the parser.
    pub name: String,
    /// Cell range covered by the column (e.g. `"B2:B40"`).
    #[serde(default)]
    pub range: String,
    /// Optional sample of raw cell values, in sheet order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<String>,
}

impl TableColumn {
    pub fn new(name: impl Into<String>, range: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            range: range.into(),
            samples: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_samples<I, S>(mut self, samples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.samples = samples.into_iter().map(Into::into).collect();
        self
    }
}

/// A table detected inside a worksheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectedTable {
    #[serde(default)]
    pub header_range: String,
    #[serde(default)]
    pub data_range: String,
    /// Columns in sheet order.
    #[serde(default)]
    pub columns: Vec<TableColumn>,
}

/// A labelled cell that anchors the layout (e.g. "Fecha de corte" in `A1`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub label: String,
    #[serde(default)]
    pub cell: String,
}

/// Compressed summary of the artifact computed by the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedFingerprint {
    #[serde(default)]
    pub anchor_hash: String,
    #[serde(default)]
    pub formula_fingerprint: String,
    /// Format name to clustered cell ranges.
    #[serde(default)]
    pub format_clusters: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuralArtifact {
    #[serde(default)]
    pub tables: Vec<DetectedTable>,
    #[serde(default)]
    pub anchors: Vec<Anchor>,
    /// Formula text to the cells where it occurs.
    #[serde(default)]
    pub formula_index: BTreeMap<String, Vec<String>>,
    /// Format name to the set of cells carrying it.
    #[serde(default)]
    pub format_groups: BTreeMap<String, BTreeSet<String>>,
    #[serde(default)]
    pub fingerprint: CompressedFingerprint,
}

impl StructuralArtifact {
    /// Iterates every column of every table, in table order.
    pub fn columns(&self) -> impl Iterator<Item = &TableColumn> {
        self.tables.iter().flat_map(|table| table.columns.iter())
    }

    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|table| table.columns.len()).sum()
    }

    /// Total number of formula occurrences across the index.
    pub fn formula_occurrences(&self) -> usize {
        self.formula_index.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
            && self.anchors.is_empty()
            && self.formula_index.is_empty()
            && self.format_groups.is_empty()
    }
}
