//! Input loading for the ticket-import decision pipeline.
//!
//! The structural artifact, job snapshots and assignment requests are produced
//! by external collaborators and handed over as JSON. This crate loads them
//! and adds the light-weight preprocessing the pipeline expects:
//!
//! - **Discovery**: expand files and directories into artifact files
//! - **Header normalization**: stable, non-empty, de-duplicated column names
//! - **Pattern signals**: numeric/date/boolean/unique shares of sample values
//! - **Column missingness**: empty-value share per sampled column
//! - **Column profiles**: numeric/categorical split, IQR outlier caps, coverage

mod discovery;
mod error;
mod headers;
mod load;
mod signals;

// === Error Types ===
pub use error::{IngestError, Result};

// === File Discovery ===
pub use discovery::{discover_artifacts, list_json_files};

// === Loading ===
pub use load::{load_artifact, load_assignment_jobs, load_confirmation, load_job, load_json};

// === Preprocessing ===
pub use headers::{normalize_header_names, normalize_headers};
pub use signals::{
    ColumnKind, ColumnMissingness, ColumnProfile, MIN_COLUMN_COVERAGE, OutlierCaps,
    PatternSignals, column_missingness, pattern_signals, profile_column,
};
