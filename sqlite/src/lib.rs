//! SQLite catalog store for Storefront.
//!
//! This crate persists the catalog in a local SQLite database through `sqlx`:
//!
//! - Schema managed by embedded migrations (`migrations/`)
//! - Foreign keys enforced on every connection
//! - WAL journaling so reads proceed while the seed loader writes
//! - Atomic product-with-variants and order writes
//!
//! # Example
//!
//! ```no_run
//! use storefront_core::catalog_store::CatalogStore;
//! use storefront_sqlite::SqliteCatalogStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteCatalogStore::in_memory().await?;
//! assert!(store.initialize().await?);
//! assert!(store.product_bundles().await?.is_empty());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod store;

pub use store::SqliteCatalogStore;
