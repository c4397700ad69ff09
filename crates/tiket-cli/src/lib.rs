//! Command-line front end for the ticket-import decision pipeline.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;
