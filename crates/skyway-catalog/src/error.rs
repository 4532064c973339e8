//! Catalog error types.

/// Errors that can occur while loading a feature catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Failed to read the catalog file from disk.
    #[error("failed to read catalog: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse catalog: {0}")]
    ParseError(#[source] ron::error::SpannedError),
}
