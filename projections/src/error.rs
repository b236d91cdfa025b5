//! Projection errors.

use storefront_core::StoreError;
use thiserror::Error;

/// Error type for projection operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    /// A bundle's nested parent row was absent.
    ///
    /// Raised instead of building a display object with a hole in it, e.g.
    /// a cart row whose product no longer exists.
    #[error("Missing parent in {bundle}: {key}")]
    MissingParent {
        /// Kind of bundle being projected.
        bundle: &'static str,
        /// Key of the row whose parent was missing.
        key: String,
    },

    /// Reading the bundles failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
