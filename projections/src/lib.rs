//! View projection for Storefront.
//!
//! # Overview
//!
//! Stores return join-shaped bundles: a parent row next to its child rows.
//! Display code wants nested objects: a product that carries its colours, a
//! manufacturer that carries its products. This crate bridges the two:
//!
//! - [`Project`]: pure, per-bundle transform to the nested view
//! - [`project_all`]: the same over a slice, preserving order
//! - [`CatalogView`]: queries a [`CatalogStore`](storefront_core::CatalogStore)
//!   and projects on every read
//!
//! ```text
//! CatalogStore ──► ProductBundle { product, colors, sizes, .. } ──► Product { colors, sizes, .. }
//! ```
//!
//! # Missing parents
//!
//! A cart or bookmark row can outlive its product. Projecting such a bundle
//! fails with [`ProjectionError::MissingParent`] rather than producing an
//! object with a hole in it.
//!
//! # Example
//!
//! ```
//! use storefront_core::{CartItem, CartItemBundle};
//! use storefront_projections::{Project, ProjectionError};
//!
//! let orphan = CartItemBundle { item: CartItem::new(1, 42, 1, 1), product: None };
//! assert!(matches!(orphan.project(), Err(ProjectionError::MissingParent { .. })));
//! ```

mod error;
mod project;
mod view;

pub use error::{ProjectionError, Result};
pub use project::{Project, project_all};
pub use view::CatalogView;
