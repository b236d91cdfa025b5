//! # Storefront Runtime
//!
//! Brings a catalog store to life: configuration, first-run seeding and the
//! `storefront` binary.
//!
//! ## Core Components
//!
//! - **Seed loader**: inserts the demo catalog concurrently, category by category ([`seed_loader`])
//! - **Bootstrap**: initializes a store and seeds it on creation ([`bootstrap`])
//! - **Config**: database settings from the environment ([`config`])
//! - **Metrics**: Prometheus counters for seeding ([`metrics`])
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use storefront_core::SeedCatalog;
//! use storefront_runtime::bootstrap;
//! use storefront_testing::InMemoryCatalogStore;
//!
//! # tokio_test::block_on(async {
//! let mut catalog = bootstrap::open(
//!     InMemoryCatalogStore::new(),
//!     Arc::new(SeedCatalog::demo()),
//!     true,
//! )
//! .await
//! .unwrap();
//!
//! let report = catalog.wait_for_seed().await.unwrap().unwrap();
//! assert!(report.is_complete());
//!
//! let products = catalog.view().products().await.unwrap();
//! assert_eq!(products.len(), 5);
//! # });
//! ```

/// Opening and first-run seeding
pub mod bootstrap;

/// Database configuration
pub mod config;

/// Error types
pub mod error;

/// Prometheus metrics for seeding
pub mod metrics;

/// Concurrent seed loading
pub mod seed_loader;

pub use bootstrap::{OpenedCatalog, open, open_sqlite};
pub use config::DatabaseConfig;
pub use error::{Result, RuntimeError, SeedError};
pub use seed_loader::{CategoryReport, SeedCategory, SeedHandle, SeedLoader, SeedReport};
