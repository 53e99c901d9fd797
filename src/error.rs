//! Error handling types and utilities.

/// A specialized Result type for rustdoc-implementors operations.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods at I/O boundaries.
pub type Result<T> = anyhow::Result<T>;

/// Error returned by [`Registry::install`](crate::registry::Registry::install).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A registrar is already installed; `Ready` never transitions again.
    #[error("an implementor registrar is already installed")]
    AlreadyInstalled,
}

/// Error returned when an implementor data file cannot be decoded.
#[derive(Debug, thiserror::Error)]
pub enum DataFileError {
    /// The script contains no `var implementors = ...` assignment.
    #[error("no `var implementors` assignment found")]
    MissingAssignment,
    /// The assigned expression is not valid JSON in any known shape.
    #[error("malformed implementor data: {0}")]
    Json(#[from] serde_json::Error),
    /// An implementor entry is neither a string, an array, nor a `{ text }` object.
    #[error("unsupported implementor entry for crate '{crate_name}': {entry}")]
    UnsupportedEntry { crate_name: String, entry: String },
    /// A payload key is not a valid crate name.
    #[error(transparent)]
    CrateName(#[from] InvalidCrateName),
}

/// Error returned when a string is not a valid crate name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid crate name '{0}'")]
pub struct InvalidCrateName(pub String);

/// Error returned when a string is not a valid `a::b::Trait` path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid trait path '{0}'")]
pub struct InvalidTraitPath(pub String);

/// Error returned when an install point cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "invalid install point '{0}': expected before-data, after-data or after-files:N"
)]
pub struct InvalidInstallPoint(pub String);
