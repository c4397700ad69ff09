//! Technician directory shared by the engine.
//!
//! The directory is reference data: loaded at startup and optionally
//! replaced while the engine runs. Each batch works on one snapshot, so a
//! reload never changes the technicians seen halfway through a batch.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tiket_ingest::{IngestError, load_json};
use tiket_model::{TechnicianId, TechnicianProfile};
use tracing::info;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DirectoryError {
    /// The directory file could not be loaded.
    #[error(transparent)]
    Load(#[from] IngestError),

    /// Two profiles share an id.
    #[error("duplicate technician id: {id}")]
    DuplicateTechnician { id: TechnicianId },
}

fn check_unique(profiles: &[TechnicianProfile]) -> Result<(), DirectoryError> {
    let mut seen = BTreeSet::new();
    for profile in profiles {
        if !seen.insert(&profile.id) {
            return Err(DirectoryError::DuplicateTechnician {
                id: profile.id.clone(),
            });
        }
    }
    Ok(())
}

/// Hot-reloadable set of technician profiles.
#[derive(Debug, Default)]
pub struct TechnicianDirectory {
    profiles: RwLock<Arc<[TechnicianProfile]>>,
}

impl TechnicianDirectory {
    pub fn new(profiles: Vec<TechnicianProfile>) -> Result<Self, DirectoryError> {
        check_unique(&profiles)?;
        Ok(Self {
            profiles: RwLock::new(profiles.into()),
        })
    }

    /// Loads a JSON array of technician profiles.
    pub fn load(path: &Path) -> Result<Self, DirectoryError> {
        let profiles: Vec<TechnicianProfile> = load_json(path, "technician directory")?;
        Self::new(profiles)
    }

    /// Current profiles; later replacements do not affect the returned value.
    pub fn snapshot(&self) -> Arc<[TechnicianProfile]> {
        Arc::clone(&self.profiles.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Swaps in a new set of profiles. The old set stays intact on error.
    pub fn replace(&self, profiles: Vec<TechnicianProfile>) -> Result<(), DirectoryError> {
        check_unique(&profiles)?;
        let count = profiles.len();
        *self.profiles.write().unwrap_or_else(PoisonError::into_inner) = profiles.into();
        info!(technicians = count, "technician directory replaced");
        Ok(())
    }

    /// Reloads the profiles from a JSON file, returning how many were loaded.
    pub fn reload_from_path(&self, path: &Path) -> Result<usize, DirectoryError> {
        let profiles: Vec<TechnicianProfile> = load_json(path, "technician directory")?;
        let count = profiles.len();
        self.replace(profiles)?;
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
