//! # Storefront Testing
//!
//! Testing utilities for the Storefront catalog.
//!
//! This crate provides:
//! - [`InMemoryCatalogStore`]: a constraint-checking in-memory store
//! - [`FaultyStore`]: a wrapper that fails, panics or slows down selected writes
//! - [`fixtures`]: record builders with deterministic timestamps
//! - [`properties`]: proptest strategies for bundles
//! - [`init_test_tracing`]: opt-in log output for tests
//!
//! ## Example
//!
//! ```
//! use storefront_core::catalog_store::CatalogStore;
//! use storefront_core::SeedCatalog;
//! use storefront_testing::{InMemoryCatalogStore, fixtures};
//!
//! # tokio_test::block_on(async {
//! let store = InMemoryCatalogStore::new();
//! fixtures::load_catalog(&store, &SeedCatalog::demo()).await.unwrap();
//!
//! let manufacturers = store.manufacturers_with_products().await.unwrap();
//! assert_eq!(manufacturers.len(), 4);
//! # });
//! ```

/// Fault-injecting store wrapper.
pub mod faulty;

/// Record builders.
pub mod fixtures;

/// In-memory catalog store.
pub mod memory_store;

/// Proptest strategies.
pub mod properties;

pub use faulty::{FailPoint, FaultyStore};
pub use memory_store::InMemoryCatalogStore;

/// Install a `tracing` subscriber for tests.
///
/// Output is filtered by `RUST_LOG` (default `warn`) and captured by the test
/// harness. Calling it more than once is harmless.
pub fn init_test_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
