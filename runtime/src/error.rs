//! Runtime errors.

use crate::seed_loader::SeedCategory;
use storefront_core::StoreError;
use thiserror::Error;

/// Why one seed category did not finish.
///
/// A failure is confined to its category: sibling categories keep running
/// and report on their own.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeedError {
    /// A store write failed; the rest of the category was skipped.
    #[error("Seeding {category} failed: {source}")]
    Store {
        /// Category whose write failed
        category: SeedCategory,
        /// Store error of the failing write
        #[source]
        source: StoreError,
    },

    /// The category's task panicked.
    #[error("Seeding {category} panicked")]
    Panicked {
        /// Category whose task panicked
        category: SeedCategory,
    },

    /// Seeding was cancelled through `SeedHandle::cancel` before the
    /// category's last write.
    #[error("Seeding {category} was cancelled")]
    Cancelled {
        /// Category whose task was cancelled
        category: SeedCategory,
    },
}

impl SeedError {
    /// The category this error belongs to.
    #[must_use]
    pub const fn category(&self) -> SeedCategory {
        match self {
            Self::Store { category, .. }
            | Self::Panicked { category }
            | Self::Cancelled { category } => *category,
        }
    }
}

/// Errors from opening and bootstrapping a catalog.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Store error while opening or initializing
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The background seed task could not be joined
    #[error("Seed task failed: {0}")]
    SeedTask(String),
}

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
