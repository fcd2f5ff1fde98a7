//! Error types.
//!
//! Resolving labels never fails; these errors come from reading configuration
//! and from the collaborators that fetch repository data and write labels.

use thiserror::Error;

/// Errors from building a [`crate::LabelMap`] out of its JSON form.
#[derive(Error, Debug)]
pub enum LabelMapError {
    #[error("invalid label map JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("label map must be a JSON object of label names to owners")]
    NotAnObject,

    #[error("owners for label '{label}' must be a string or an array of strings")]
    InvalidOwners { label: String },
}

/// Errors reported by a [`crate::RepositoryProvider`] or
/// [`crate::LabelWriter`]. Missing data is not an error; providers report it
/// as `Ok(None)`.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("repository data unavailable: {0}")]
    Unavailable(String),

    #[error("permission denied: {action}")]
    PermissionDenied { action: String },
}
