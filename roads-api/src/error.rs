use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::fmt;

/// Errors that abort a computation. Everything else is recovered locally and reported as a
/// [`Diagnostic`] next to the normal output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputeError {
    /// Lane width or tile size is not a positive finite number, or a factor is negative.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

impl ComputeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ComputeError::InvalidSettings(_) => ErrorKind::InvalidSettings,
        }
    }
}

pub type ComputeResult<T> = std::result::Result<T, ComputeError>;

/// Taxonomy of everything that can go wrong while deriving road geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Fatal, see [`ComputeError::InvalidSettings`].
    InvalidSettings,
    /// A road references a schema point id that does not exist. The edges touching it are dropped.
    DanglingReference,
    /// A zero length segment or direction, or a collapsed piece. Dropped.
    DegenerateGeometry,
    /// A polygon with fewer than 3 vertices reached a mesh builder. Skipped.
    MalformedPolygon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}
