//! Join-shaped read results.
//!
//! A bundle pairs a parent row with the child rows a relational join would
//! return next to it. Stores produce bundles; the projection crate turns them
//! into the nested objects display code consumes.
//!
//! Top-level parents are plain fields, so a bundle can never be built without
//! one. Relations a join may legitimately come back without (the product of a
//! cart row whose product was removed, the manufacturer of an orphaned
//! product) are `Option`s and are checked at projection time.

use crate::model::{
    BookmarkItem, CartItem, Manufacturer, Order, OrderItem, OrderPayment, Product,
    ProductColor, ProductSize, Review,
};
use serde::{Deserialize, Serialize};

/// A product with its manufacturer and child collections.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductBundle {
    /// The product row
    pub product: Product,
    /// The owning manufacturer, if the join found it
    pub manufacturer: Option<Manufacturer>,
    /// Colour variant rows
    pub colors: Vec<ProductColor>,
    /// Size rows
    pub sizes: Vec<ProductSize>,
    /// Review rows
    pub reviews: Vec<Review>,
}

impl ProductBundle {
    /// Bundle a product with no related rows.
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self {
            product,
            manufacturer: None,
            colors: Vec::new(),
            sizes: Vec::new(),
            reviews: Vec::new(),
        }
    }
}

/// A manufacturer with all of its products.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManufacturerBundle {
    /// The manufacturer row
    pub manufacturer: Manufacturer,
    /// Product bundles owned by this manufacturer
    pub products: Vec<ProductBundle>,
}

/// A cart row with the product it points at.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItemBundle {
    /// The cart row
    pub item: CartItem,
    /// The referenced product, if the join found it
    pub product: Option<ProductBundle>,
}

/// A bookmark row with the product it points at.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookmarkItemBundle {
    /// The bookmark row
    pub item: BookmarkItem,
    /// The referenced product, if the join found it
    pub product: Option<ProductBundle>,
}

/// An order with its lines and payment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderBundle {
    /// The order row
    pub order: Order,
    /// Order lines
    pub items: Vec<OrderItem>,
    /// Payment row, absent for unpaid orders
    pub payment: Option<OrderPayment>,
}
