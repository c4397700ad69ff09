use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    #[error("invalid ticket id: {0:?}")]
    InvalidTicketId(String),
    #[error("invalid technician id: {0:?}")]
    InvalidTechnicianId(String),
    #[error("unknown {kind} label: {value:?}")]
    UnknownLabel { kind: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
