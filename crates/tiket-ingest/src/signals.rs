//! Value-pattern signals computed from column samples.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use tiket_model::StructuralArtifact;

const BOOLEAN_TRUTHY: &[&str] = &["true", "1", "yes", "si", "sí"];
const BOOLEAN_FALSY: &[&str] = &["false", "0", "no"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M"];

/// Columns with a smaller filled-in share are too sparse to model.
pub const MIN_COLUMN_COVERAGE: f64 = 0.12;
const NUMERIC_SHARE: f64 = 0.6;
const NUMERIC_MIN_UNIQUE: usize = 3;
const IQR_FACTOR: f64 = 1.5;

/// Dominant value patterns of a column, as shares of its non-empty samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternSignals {
    pub numeric_ratio: f64,
    pub date_ratio: f64,
    pub boolean_ratio: f64,
    pub unique_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl ColumnKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// IQR caps for a numeric column and how many samples fall outside them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierCaps {
    pub lower: f64,
    pub upper: f64,
    pub capped: usize,
}

/// Modeling readiness of one column's samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub kind: ColumnKind,
    /// Share of samples that are filled in.
    pub coverage: f64,
    /// Coverage is below [`MIN_COLUMN_COVERAGE`].
    pub sparse: bool,
    /// Only present for numeric columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outliers: Option<OutlierCaps>,
}

/// Share of empty sample values for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMissingness {
    pub column: String,
    pub empty_ratio: f64,
    pub sample_count: usize,
}

/// Profiles sample values; all ratios are zero when nothing is filled in.
pub fn pattern_signals<S: AsRef<str>>(samples: &[S]) -> PatternSignals {
    let values: Vec<&str> = samples
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .collect();
    if values.is_empty() {
        return PatternSignals::default();
    }

    let total = values.len() as f64;
    let numeric = values.iter().filter(|v| is_numeric(v)).count();
    let dates = values.iter().filter(|v| is_date(v)).count();
    let booleans = values.iter().filter(|v| is_boolean(v)).count();
    let unique: BTreeSet<&str> = values.iter().copied().collect();

    PatternSignals {
        numeric_ratio: numeric as f64 / total,
        date_ratio: dates as f64 / total,
        boolean_ratio: booleans as f64 / total,
        unique_ratio: unique.len() as f64 / total,
    }
}

/// Splits numeric from categorical columns and summarizes numeric outliers.
///
/// A column is numeric when more than 60% of its samples parse as numbers and
/// it has more than three distinct filled-in values. Outlier caps use the
/// interquartile rule: `q1 - 1.5 * iqr` and `q3 + 1.5 * iqr`.
pub fn profile_column<S: AsRef<str>>(samples: &[S]) -> ColumnProfile {
    let values: Vec<&str> = samples
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .collect();
    let coverage = if samples.is_empty() {
        0.0
    } else {
        values.len() as f64 / samples.len() as f64
    };

    let numbers: Vec<f64> = values
        .iter()
        .filter_map(|v| v.parse::<f64>().ok().filter(|n| n.is_finite()))
        .collect();
    let numeric_share = if samples.is_empty() {
        0.0
    } else {
        numbers.len() as f64 / samples.len() as f64
    };
    let unique = values.iter().copied().collect::<BTreeSet<&str>>().len();

    let (kind, outliers) = if numeric_share > NUMERIC_SHARE && unique > NUMERIC_MIN_UNIQUE {
        (ColumnKind::Numeric, iqr_caps(numbers))
    } else {
        (ColumnKind::Categorical, None)
    };

    ColumnProfile {
        kind,
        coverage,
        sparse: coverage < MIN_COLUMN_COVERAGE,
        outliers,
    }
}

fn iqr_caps(mut numbers: Vec<f64>) -> Option<OutlierCaps> {
    if numbers.is_empty() {
        return None;
    }
    numbers.sort_by(f64::total_cmp);
    let q1 = quantile(&numbers, 0.25);
    let q3 = quantile(&numbers, 0.75);
    let iqr = q3 - q1;
    let lower = q1 - IQR_FACTOR * iqr;
    let upper = q3 + IQR_FACTOR * iqr;
    let capped = numbers.iter().filter(|&&n| n < lower || n > upper).count();
    Some(OutlierCaps {
        lower,
        upper,
        capped,
    })
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let below = position.floor() as usize;
    let above = position.ceil() as usize;
    let fraction = position - below as f64;
    sorted[below] + (sorted[above] - sorted[below]) * fraction
}

/// Empty-value share for every column that carries samples, in table order.
pub fn column_missingness(artifact: &StructuralArtifact) -> Vec<ColumnMissingness> {
    artifact
        .columns()
        .filter(|column| !column.samples.is_empty())
        .map(|column| {
            let empty = column
                .samples
                .iter()
                .filter(|value| value.trim().is_empty())
                .count();
            ColumnMissingness {
                column: column.name.clone(),
                empty_ratio: empty as f64 / column.samples.len() as f64,
                sample_count: column.samples.len(),
            }
        })
        .collect()
}

fn is_numeric(value: &str) -> bool {
    value.parse::<f64>().is_ok_and(f64::is_finite)
}

fn is_boolean(value: &str) -> bool {
    let lower = value.to_lowercase();
    BOOLEAN_TRUTHY.contains(&lower.as_str()) || BOOLEAN_FALSY.contains(&lower.as_str())
}

fn is_date(value: &str) -> bool {
    DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(value, fmt).is_ok())
        || DATETIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(value, fmt).is_ok())
        || chrono::DateTime::parse_from_rfc3339(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiket_model::{DetectedTable, TableColumn};

    #[test]
    fn empty_samples_give_zero_signals() {
        let signals = pattern_signals(&["", "  "]);
        assert_eq!(signals, PatternSignals::default());
    }

    #[test]
    fn numeric_and_boolean_overlap_like_the_worker() {
        let signals = pattern_signals(&["1", "0", "si", "no"]);
        assert!((signals.numeric_ratio - 0.5).abs() < 1e-9);
        assert!((signals.boolean_ratio - 1.0).abs() < 1e-9);
        assert!((signals.unique_ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn dates_in_common_layouts() {
        let signals = pattern_signals(&["2024-01-15", "15/01/2024", "2024-01-15 10:30:00", "hoy"]);
        assert!((signals.date_ratio - 0.75).abs() < 1e-9);
        assert_eq!(signals.numeric_ratio, 0.0);
    }

    #[test]
    fn numeric_column_reports_iqr_caps() {
        let profile = profile_column(&["10", "12", "11", "13", "100", ""]);
        assert_eq!(profile.kind, ColumnKind::Numeric);
        assert!((profile.coverage - 5.0 / 6.0).abs() < 1e-9);
        assert!(!profile.sparse);

        let caps = profile.outliers.unwrap();
        // q1 = 11, q3 = 13
        assert!((caps.lower - 8.0).abs() < 1e-9);
        assert!((caps.upper - 16.0).abs() < 1e-9);
        assert_eq!(caps.capped, 1);
    }

    #[test]
    fn few_distinct_numbers_stay_categorical() {
        let profile = profile_column(&["1", "2", "1", "3", "2"]);
        assert_eq!(profile.kind, ColumnKind::Categorical);
        assert!(profile.outliers.is_none());
    }

    #[test]
    fn mostly_text_is_categorical() {
        let profile = profile_column(&["10", "11", "12", "13", "n/a", "pendiente", "x"]);
        assert_eq!(profile.kind, ColumnKind::Categorical);
    }

    #[test]
    fn thin_columns_are_sparse() {
        let mut samples = vec![""; 8];
        samples.push("Ana");
        let profile = profile_column(samples.as_slice());
        assert!(profile.sparse);
        assert!((profile.coverage - 1.0 / 9.0).abs() < 1e-9);

        let empty: [&str; 0] = [];
        assert!(profile_column(&empty).sparse);
    }

    #[test]
    fn missingness_only_for_sampled_columns() {
        let artifact = StructuralArtifact {
            tables: vec![DetectedTable {
                columns: vec![
                    TableColumn::new("Cliente", "A2:A5").with_samples(["Ana", "", " ", "Luis"]),
                    TableColumn::new("Valor", "B2:B5"),
                ],
                ..DetectedTable::default()
            }],
            ..StructuralArtifact::default()
        };

        let report = column_missingness(&artifact);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].column, "Cliente");
        assert!((report[0].empty_ratio - 0.5).abs() < 1e-9);
        assert_eq!(report[0].sample_count, 4);
    }
}
