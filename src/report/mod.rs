//! Report normalization: decode, validate and merge a raw yearly report
//! into the canonical in-memory `Report`.

pub mod assemble;
pub mod normalize;
pub mod types;
pub mod validation;

pub use assemble::*;
pub use normalize::*;
pub use types::*;
pub use validation::*;

use serde::Serialize;
use thiserror::Error;

/// Failure while talking to the report endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("Report endpoint is not reachable at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Report endpoint returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Response body is not valid JSON: {0}")]
    Body(String),
}

/// Any reason a fetch can end without a report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Invalid report payload: {0}")]
    Validation(#[from] ValidationError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Machine-readable cause of a rejected fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    Transport,
}

impl ReportError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Validation(_) => FailureKind::Validation,
            Self::Transport(_) => FailureKind::Transport,
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Transport => write!(f, "transport"),
        }
    }
}
