//! Storage access layer for the catalog.
//!
//! [`CatalogStore`] is the seam between the domain and persistence. The seed
//! loader writes through it, and the projection crate reads bundles from it.
//!
//! # Implementations
//!
//! - `SqliteCatalogStore` (in `storefront-sqlite`): the persisted local database
//! - `InMemoryCatalogStore` (in `storefront-testing`): fast, deterministic tests
//!
//! # Write semantics
//!
//! - `insert_*` methods fail with [`StoreError::Conflict`] when the key exists.
//! - `save_*` methods upsert.
//! - Every child row must reference an existing parent, otherwise the call
//!   fails with [`StoreError::ForeignKeyViolation`] and writes nothing.
//!
//! # Example
//!
//! ```no_run
//! use storefront_core::catalog_store::{CatalogStore, StoreError};
//!
//! async fn colour_count<S: CatalogStore>(store: &S, product_id: i64) -> Result<usize, StoreError> {
//!     let bundle = store.product_bundle(product_id).await?;
//!     Ok(bundle.map_or(0, |b| b.colors.len()))
//! }
//! ```

use crate::bundle::{
    BookmarkItemBundle, CartItemBundle, ManufacturerBundle, OrderBundle, ProductBundle,
};
use crate::model::{
    Advertisement, BookmarkItem, CartItem, Location, Manufacturer, Notification, Order,
    OrderItem, OrderPayment, PaymentProvider, Product, ProductColor, ProductSize, Review, User,
    UserPaymentProvider,
};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during catalog store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A child row referenced a parent that does not exist.
    #[error("Foreign key violation on {entity}: {detail}")]
    ForeignKeyViolation {
        /// Table or entity the failed row belongs to.
        entity: &'static str,
        /// Which reference was dangling.
        detail: String,
    },

    /// A row with the same key already exists.
    #[error("Conflict on {entity}: key {key} already exists")]
    Conflict {
        /// Table or entity the failed row belongs to.
        entity: &'static str,
        /// The duplicated key.
        key: String,
    },

    /// The addressed row does not exist.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Table or entity that was addressed.
        entity: &'static str,
        /// The missing key.
        key: String,
    },

    /// Database connection or query error.
    #[error("Database error: {0}")]
    Database(String),

    /// Schema creation or migration error.
    #[error("Migration error: {0}")]
    Migration(String),
}

/// Result type for catalog store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Storage access layer for catalog, account and shopping data.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: the seed loader shares one store
/// across concurrently running tasks, and reads may run at the same time.
///
/// # Consistency
///
/// Reads never wait for in-flight writes to complete. A read issued while the
/// seed loader is running returns whatever has been committed so far.
pub trait CatalogStore: Send + Sync {
    /// Create the schema if needed.
    ///
    /// Returns `true` when this call created the database, `false` when the
    /// schema already existed. Callers use this to run first-creation work
    /// such as seeding exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Migration`] if the schema cannot be created.
    fn initialize(&self) -> impl Future<Output = Result<bool>> + Send;

    // ── seed writes ────────────────────────────────────────────────

    /// Insert or replace the local user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the write fails.
    fn save_user(&self, user: &User) -> impl Future<Output = Result<()>> + Send;

    /// Insert a manufacturer.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the id is taken.
    fn insert_manufacturer(
        &self,
        manufacturer: &Manufacturer,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Insert an advertisement.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the id is taken.
    fn insert_advertisement(
        &self,
        advertisement: &Advertisement,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Insert a product row without variants.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ForeignKeyViolation`] if the manufacturer does not
    /// exist, [`StoreError::Conflict`] if the id is taken.
    fn insert_product(&self, product: &Product) -> impl Future<Output = Result<()>> + Send;

    /// Insert one colour variant.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ForeignKeyViolation`] if the product does not exist.
    fn insert_product_color(
        &self,
        color: &ProductColor,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Insert one size row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ForeignKeyViolation`] if the product does not exist.
    fn insert_product_size(&self, size: &ProductSize) -> impl Future<Output = Result<()>> + Send;

    /// Insert a product and all of its variants atomically.
    ///
    /// Either the product and every colour and size row are committed, or
    /// nothing is.
    ///
    /// # Errors
    ///
    /// Returns the first constraint or database error; nothing is written.
    fn insert_product_with_variants(
        &self,
        product: &Product,
        colors: &[ProductColor],
        sizes: &[ProductSize],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Insert or replace a payment provider.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the write fails.
    fn save_payment_provider(
        &self,
        provider: &PaymentProvider,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Register a card with a payment provider.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ForeignKeyViolation`] if the provider does not exist.
    fn save_user_payment_provider(
        &self,
        link: &UserPaymentProvider,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Insert or replace a location.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the write fails.
    fn save_location(&self, location: &Location) -> impl Future<Output = Result<()>> + Send;

    // ── application writes ─────────────────────────────────────────

    /// Insert a review.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ForeignKeyViolation`] if the product or user does
    /// not exist.
    fn insert_review(&self, review: &Review) -> impl Future<Output = Result<()>> + Send;

    /// Put a product in a user's cart.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ForeignKeyViolation`] if the product or user does
    /// not exist.
    fn add_cart_item(&self, item: &CartItem) -> impl Future<Output = Result<()>> + Send;

    /// Remove a cart row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the row does not exist.
    fn remove_cart_item(&self, id: i64) -> impl Future<Output = Result<()>> + Send;

    /// Bookmark a product.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ForeignKeyViolation`] if the product or user does
    /// not exist.
    fn add_bookmark(&self, item: &BookmarkItem) -> impl Future<Output = Result<()>> + Send;

    /// Remove a bookmark row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the row does not exist.
    fn remove_bookmark(&self, id: i64) -> impl Future<Output = Result<()>> + Send;

    /// Record an order, its lines and its payment atomically.
    ///
    /// # Errors
    ///
    /// Returns the first constraint or database error; nothing is written.
    fn place_order(
        &self,
        order: &Order,
        items: &[OrderItem],
        payment: Option<&OrderPayment>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Insert or replace a notification.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ForeignKeyViolation`] if the user does not exist.
    fn save_notification(
        &self,
        notification: &Notification,
    ) -> impl Future<Output = Result<()>> + Send;

    // ── reads ──────────────────────────────────────────────────────

    /// Load a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn user(&self, user_id: i64) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Load the user whose email or phone number equals `login`.
    ///
    /// When several users match, the one with the lowest id wins.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn user_by_login(&self, login: &str) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Load the stored location, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn location(&self) -> impl Future<Output = Result<Option<Location>>> + Send;

    /// All advertisements ordered by rank.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn advertisements(&self) -> impl Future<Output = Result<Vec<Advertisement>>> + Send;

    /// All payment providers ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn payment_providers(&self) -> impl Future<Output = Result<Vec<PaymentProvider>>> + Send;

    /// All registered cards ordered by provider.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn user_payment_providers(
        &self,
    ) -> impl Future<Output = Result<Vec<UserPaymentProvider>>> + Send;

    /// Every manufacturer with its product bundles, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn manufacturers_with_products(
        &self,
    ) -> impl Future<Output = Result<Vec<ManufacturerBundle>>> + Send;

    /// Every product bundle ordered by product id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn product_bundles(&self) -> impl Future<Output = Result<Vec<ProductBundle>>> + Send;

    /// One product bundle.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn product_bundle(
        &self,
        product_id: i64,
    ) -> impl Future<Output = Result<Option<ProductBundle>>> + Send;

    /// A user's cart rows with their products, ordered by row id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn cart_items(
        &self,
        user_id: i64,
    ) -> impl Future<Output = Result<Vec<CartItemBundle>>> + Send;

    /// A user's bookmarks with their products, ordered by row id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn bookmark_items(
        &self,
        user_id: i64,
    ) -> impl Future<Output = Result<Vec<BookmarkItemBundle>>> + Send;

    /// A user's orders with lines and payment, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn orders(&self, user_id: i64) -> impl Future<Output = Result<Vec<OrderBundle>>> + Send;

    /// A user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    fn notifications(
        &self,
        user_id: i64,
    ) -> impl Future<Output = Result<Vec<Notification>>> + Send;
}

/// Shared stores delegate to the store they point at, so one store can back
/// the seed loader and any number of views at the same time.
impl<T: CatalogStore> CatalogStore for Arc<T> {
    fn initialize(&self) -> impl Future<Output = Result<bool>> + Send {
        (**self).initialize()
    }

    fn save_user(&self, user: &User) -> impl Future<Output = Result<()>> + Send {
        (**self).save_user(user)
    }

    fn insert_manufacturer(
        &self,
        manufacturer: &Manufacturer,
    ) -> impl Future<Output = Result<()>> + Send {
        (**self).insert_manufacturer(manufacturer)
    }

    fn insert_advertisement(
        &self,
        advertisement: &Advertisement,
    ) -> impl Future<Output = Result<()>> + Send {
        (**self).insert_advertisement(advertisement)
    }

    fn insert_product(&self, product: &Product) -> impl Future<Output = Result<()>> + Send {
        (**self).insert_product(product)
    }

    fn insert_product_color(
        &self,
        color: &ProductColor,
    ) -> impl Future<Output = Result<()>> + Send {
        (**self).insert_product_color(color)
    }

    fn insert_product_size(&self, size: &ProductSize) -> impl Future<Output = Result<()>> + Send {
        (**self).insert_product_size(size)
    }

    fn insert_product_with_variants(
        &self,
        product: &Product,
        colors: &[ProductColor],
        sizes: &[ProductSize],
    ) -> impl Future<Output = Result<()>> + Send {
        (**self).insert_product_with_variants(product, colors, sizes)
    }

    fn save_payment_provider(
        &self,
        provider: &PaymentProvider,
    ) -> impl Future<Output = Result<()>> + Send {
        (**self).save_payment_provider(provider)
    }

    fn save_user_payment_provider(
        &self,
        link: &UserPaymentProvider,
    ) -> impl Future<Output = Result<()>> + Send {
        (**self).save_user_payment_provider(link)
    }

    fn save_location(&self, location: &Location) -> impl Future<Output = Result<()>> + Send {
        (**self).save_location(location)
    }

    fn insert_review(&self, review: &Review) -> impl Future<Output = Result<()>> + Send {
        (**self).insert_review(review)
    }

    fn add_cart_item(&self, item: &CartItem) -> impl Future<Output = Result<()>> + Send {
        (**self).add_cart_item(item)
    }

    fn remove_cart_item(&self, id: i64) -> impl Future<Output = Result<()>> + Send {
        (**self).remove_cart_item(id)
    }

    fn add_bookmark(&self, item: &BookmarkItem) -> impl Future<Output = Result<()>> + Send {
        (**self).add_bookmark(item)
    }

    fn remove_bookmark(&self, id: i64) -> impl Future<Output = Result<()>> + Send {
        (**self).remove_bookmark(id)
    }

    fn place_order(
        &self,
        order: &Order,
        items: &[OrderItem],
        payment: Option<&OrderPayment>,
    ) -> impl Future<Output = Result<()>> + Send {
        (**self).place_order(order, items, payment)
    }

    fn save_notification(
        &self,
        notification: &Notification,
    ) -> impl Future<Output = Result<()>> + Send {
        (**self).save_notification(notification)
    }

    fn user(&self, user_id: i64) -> impl Future<Output = Result<Option<User>>> + Send {
        (**self).user(user_id)
    }

    fn user_by_login(&self, login: &str) -> impl Future<Output = Result<Option<User>>> + Send {
        (**self).user_by_login(login)
    }

    fn location(&self) -> impl Future<Output = Result<Option<Location>>> + Send {
        (**self).location()
    }

    fn advertisements(&self) -> impl Future<Output = Result<Vec<Advertisement>>> + Send {
        (**self).advertisements()
    }

    fn payment_providers(&self) -> impl Future<Output = Result<Vec<PaymentProvider>>> + Send {
        (**self).payment_providers()
    }

    fn user_payment_providers(
        &self,
    ) -> impl Future<Output = Result<Vec<UserPaymentProvider>>> + Send {
        (**self).user_payment_providers()
    }

    fn manufacturers_with_products(
        &self,
    ) -> impl Future<Output = Result<Vec<ManufacturerBundle>>> + Send {
        (**self).manufacturers_with_products()
    }

    fn product_bundles(&self) -> impl Future<Output = Result<Vec<ProductBundle>>> + Send {
        (**self).product_bundles()
    }

    fn product_bundle(
        &self,
        product_id: i64,
    ) -> impl Future<Output = Result<Option<ProductBundle>>> + Send {
        (**self).product_bundle(product_id)
    }

    fn cart_items(
        &self,
        user_id: i64,
    ) -> impl Future<Output = Result<Vec<CartItemBundle>>> + Send {
        (**self).cart_items(user_id)
    }

    fn bookmark_items(
        &self,
        user_id: i64,
    ) -> impl Future<Output = Result<Vec<BookmarkItemBundle>>> + Send {
        (**self).bookmark_items(user_id)
    }

    fn orders(&self, user_id: i64) -> impl Future<Output = Result<Vec<OrderBundle>>> + Send {
        (**self).orders(user_id)
    }

    fn notifications(
        &self,
        user_id: i64,
    ) -> impl Future<Output = Result<Vec<Notification>>> + Send {
        (**self).notifications(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_messages() {
        let err = StoreError::ForeignKeyViolation {
            entity: "product_colors",
            detail: "product 9 does not exist".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Foreign key violation on product_colors: product 9 does not exist"
        );

        let err = StoreError::Conflict {
            entity: "manufacturers",
            key: "1".to_string(),
        };
        assert_eq!(err.to_string(), "Conflict on manufacturers: key 1 already exists");
    }
}
