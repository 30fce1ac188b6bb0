//! Typed errors and the single failure channel shared by client, form and page.

use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing reference: {kind} '{id}'")]
    MissingReference { kind: &'static str, id: String },
    #[error("duplicate field '{field}' in entity '{entity}'")]
    DuplicateField { entity: String, field: String },
    #[error("duplicate entity id: {0}")]
    DuplicateEntity(String),
    #[error("entity '{0}' has no entity tag; code generation is unavailable")]
    MissingEntityTag(String),
    #[error("config load: {0}")]
    Load(String),
    #[error("settings: {0}")]
    Settings(String),
    #[error("validation: {0}")]
    Validation(String),
}

/// Inline, per-field validation messages keyed by field name.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),
    #[error("conflict: {message}")]
    Conflict { message: String },
    #[error("remote error {status}: {message}")]
    Remote { status: u16, message: String },
    #[error("authentication failed")]
    Unauthorized,
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Coarse classification surfaced to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caught locally, shown inline per field.
    Validation,
    /// Structured uniqueness violation reported by the server.
    Conflict,
    /// Anything else that went wrong remotely or in transit.
    Remote,
}

impl ScaffoldError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScaffoldError::Validation(_) => ErrorKind::Validation,
            ScaffoldError::Conflict { .. } => ErrorKind::Conflict,
            _ => ErrorKind::Remote,
        }
    }

    /// Conflict message when the server supplied one.
    pub fn conflict_message(&self) -> Option<&str> {
        match self {
            ScaffoldError::Conflict { message } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}
