//! Error types for the coverage identifier codec.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Result type alias using CoverageError.
pub type CoverageResult<T> = Result<T, CoverageError>;

/// Kind of catalog entity a lookup failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Dimension,
    Value,
    Configuration,
    ClimaticIndicator,
    SpatialRegion,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Dimension => "Dimension",
            EntityKind::Value => "Value",
            EntityKind::Configuration => "Configuration",
            EntityKind::ClimaticIndicator => "Climatic indicator",
            EntityKind::SpatialRegion => "Spatial region",
        };
        f.write_str(name)
    }
}

/// Primary error type for codec operations.
#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("{kind} not found: {name}")]
    NotFound { kind: EntityKind, name: String },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The snapshot contradicts itself, e.g. a configuration referencing a
    /// dimension that is not in the catalog.
    #[error("Inconsistent catalog snapshot: {0}")]
    InconsistentSnapshot(String),
}

impl CoverageError {
    pub fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        CoverageError::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        CoverageError::Configuration(message.into())
    }

    pub fn inconsistent(message: impl Into<String>) -> Self {
        CoverageError::InconsistentSnapshot(message.into())
    }

    /// Get the HTTP status code the API layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            CoverageError::NotFound { .. } => 404,
            CoverageError::Decode(_) | CoverageError::Configuration(_) => 400,
            CoverageError::InconsistentSnapshot(_) => 500,
        }
    }

    /// Whether the error points at a stale or corrupt snapshot rather than bad input.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CoverageError::InconsistentSnapshot(_))
    }

    /// The decode failure reason, if this is a decode error.
    pub fn decode_reason(&self) -> Option<&DecodeReason> {
        match self {
            CoverageError::Decode(err) => Some(&err.reason),
            _ => None,
        }
    }
}

/// Why an identifier could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodeReason {
    TooShort { expected: usize, found: usize },
    TooLong { expected: usize, found: usize },
    UnknownToken { token: String },
    Ambiguous { candidates: Vec<String> },
    NoMatchingConfiguration,
}

impl fmt::Display for DecodeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeReason::TooShort { expected, found } => {
                write!(f, "too short: expected at least {} tokens, found {}", expected, found)
            }
            DecodeReason::TooLong { expected, found } => {
                write!(f, "too long: expected at most {} tokens, found {}", expected, found)
            }
            DecodeReason::UnknownToken { token } => write!(f, "unknown token '{}'", token),
            DecodeReason::Ambiguous { candidates } => {
                write!(f, "ambiguous, matches {}", candidates.join(", "))
            }
            DecodeReason::NoMatchingConfiguration => {
                f.write_str("no configuration matches identifier")
            }
        }
    }
}

/// An identifier that could not be decoded against any configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("Cannot decode '{identifier}': {reason}")]
pub struct DecodeError {
    pub identifier: String,
    pub reason: DecodeReason,
    /// Suffix lengths the fixed-schema resolver tried, longest first.
    pub attempted_lengths: Vec<usize>,
}

impl DecodeError {
    pub fn new(identifier: impl Into<String>, reason: DecodeReason) -> Self {
        Self {
            identifier: identifier.into(),
            reason,
            attempted_lengths: Vec::new(),
        }
    }

    pub fn with_attempted_lengths(mut self, lengths: Vec<usize>) -> Self {
        self.attempted_lengths = lengths;
        self
    }

    pub fn too_short(identifier: &str, expected: usize, found: usize) -> Self {
        Self::new(identifier, DecodeReason::TooShort { expected, found })
    }

    pub fn too_long(identifier: &str, expected: usize, found: usize) -> Self {
        Self::new(identifier, DecodeReason::TooLong { expected, found })
    }

    pub fn unknown_token(identifier: &str, token: impl Into<String>) -> Self {
        Self::new(
            identifier,
            DecodeReason::UnknownToken {
                token: token.into(),
            },
        )
    }
}

impl From<anyhow::Error> for CoverageError {
    fn from(err: anyhow::Error) -> Self {
        CoverageError::Configuration(format!("{:#}", err))
    }
}
