//! JSON loaders for the inputs handed over by external collaborators.

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use tiket_model::{
    AssignmentJob, ImportJob, StructuralArtifact, TemplateConfirmation, normalize_document,
};

use crate::error::{IngestError, Result};

/// Loads a structural artifact produced by the spreadsheet-parsing service.
pub fn load_artifact(path: &Path) -> Result<StructuralArtifact> {
    let artifact: StructuralArtifact = load_json(path, "structural artifact")?;
    debug!(
        path = %path.display(),
        tables = artifact.tables.len(),
        anchors = artifact.anchors.len(),
        "loaded artifact"
    );
    Ok(artifact)
}

/// Loads an import job snapshot.
pub fn load_job(path: &Path) -> Result<ImportJob> {
    load_json(path, "import job")
}

/// Loads a list of assignment requests.
///
/// Identity documents are normalized; one with no letters or digits is dropped.
pub fn load_assignment_jobs(path: &Path) -> Result<Vec<AssignmentJob>> {
    let mut jobs: Vec<AssignmentJob> = load_json(path, "assignment jobs")?;
    for job in &mut jobs {
        job.identity_document = job
            .identity_document
            .as_deref()
            .and_then(normalize_document);
    }
    Ok(jobs)
}

/// Loads a confirm-template decision.
pub fn load_confirmation(path: &Path) -> Result<TemplateConfirmation> {
    load_json(path, "template confirmation")
}

/// Reads and deserializes a JSON file, keeping the path in every error.
pub fn load_json<T: DeserializeOwned>(path: &Path, kind: &'static str) -> Result<T> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| IngestError::Json {
        kind,
        path: path.to_path_buf(),
        source,
    })
}
