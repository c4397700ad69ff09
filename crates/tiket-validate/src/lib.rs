//! Validation for import jobs.
//!
//! - **Missingness**: profile the risk of filling in absent values
//! - **Diagnostics**: gate an import job on everything known about it
//! - **Confirmation**: reject contradictory confirm-template decisions

mod confirmation;
mod diagnostics;
mod error;
mod missingness;

pub use confirmation::{ConfirmedTemplate, validate_confirmation};
pub use diagnostics::analyze_diagnostics;
pub use error::{ConfirmationError, Result};
pub use missingness::detect_missingness;
