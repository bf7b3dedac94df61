//! Library error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors produced by site, path, and routing operations.
#[derive(Debug, Error)]
pub enum SiteError {
    /// Invalid configuration (locale registry, snapshot consistency).
    /// Fatal; surfaced to the operator at startup or load time.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A sibling already holds this slug for this locale. Recoverable;
    /// the editor picks a different slug.
    #[error("duplicate slug '{slug}' among siblings for locale '{locale}'")]
    DuplicateSlug { slug: String, locale: String },

    /// Slug failed validation (empty, or characters outside `[a-z0-9_-]`).
    #[error("invalid slug: {0}")]
    InvalidSlug(String),

    /// Locale is not present in the registry.
    #[error("unknown locale '{0}'")]
    UnknownLocale(String),

    /// Node id does not exist in the tree.
    #[error("unknown node {0}")]
    UnknownNode(Uuid),

    /// Structural tree mutation rejected (moving a node under its own
    /// subtree, removing the root, sibling key exhaustion).
    #[error("invalid tree operation: {0}")]
    InvalidOperation(String),

    /// The router could not resolve a path. Not fatal; maps to a
    /// standard "not found" outcome at the caller.
    #[error("not found")]
    NotFound,
}

/// Result type alias using SiteError.
pub type SiteResult<T> = Result<T, SiteError>;
