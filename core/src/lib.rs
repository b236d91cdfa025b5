//! # Storefront Core
//!
//! Domain model and storage abstractions for the Storefront catalog.
//!
//! This crate holds everything the other crates agree on:
//!
//! - **Model**: catalog, account and shopping records ([`model`])
//! - **Bundles**: join-shaped read results pairing a parent with its child rows ([`bundle`])
//! - **Catalog store**: the storage access layer trait and its error type ([`catalog_store`])
//! - **Seed catalog**: the immutable demo dataset loaded into a fresh database ([`seed`])
//!
//! ## Architecture
//!
//! ```text
//!   SeedCatalog ──► SeedLoader ──► CatalogStore ──► bundles ──► Project ──► display objects
//!   (core)          (runtime)      (sqlite/memory)  (core)      (projections)
//! ```
//!
//! The write side (seeding) and the read side (projection) never talk to each
//! other; the store schema is the only interface between them.
//!
//! ## Example
//!
//! ```ignore
//! use storefront_core::catalog_store::{CatalogStore, StoreError};
//!
//! async fn product_names<S: CatalogStore>(store: &S) -> Result<Vec<String>, StoreError> {
//!     let bundles = store.product_bundles().await?;
//!     Ok(bundles.into_iter().map(|b| b.product.name).collect())
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};

/// Catalog, account and shopping records.
pub mod model;

/// Join-shaped read results.
pub mod bundle;

/// Storage access layer trait and errors.
pub mod catalog_store;

/// Immutable demo dataset for fresh databases.
pub mod seed;

pub use bundle::{
    BookmarkItemBundle, CartItemBundle, ManufacturerBundle, OrderBundle, ProductBundle,
};
pub use catalog_store::{CatalogStore, StoreError};
pub use model::{
    Advertisement, BookmarkItem, CartItem, Location, Manufacturer, Notification, Order,
    OrderItem, OrderPayment, PaymentProvider, Product, ProductColor, ProductSize,
    ResourceRef, Review, User, UserPaymentProvider, hash_password, hash_password_with_salt,
};
pub use seed::{ProductSeed, SeedCatalog};
