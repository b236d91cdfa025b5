//! In-memory catalog store for fast, deterministic tests.
//!
//! [`InMemoryCatalogStore`] keeps every table in ordinary collections behind an
//! `RwLock` and enforces the same key and foreign-key rules as the SQLite
//! store, so tests written against it exercise real constraint behaviour.
//! Multi-row writes stage their changes on a copy of the tables and swap it in
//! only when every row was accepted.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for lock poisoning
#![allow(clippy::missing_panics_doc)] // Only panics on a poisoned lock

use storefront_core::bundle::{
    BookmarkItemBundle, CartItemBundle, ManufacturerBundle, OrderBundle, ProductBundle,
};
use storefront_core::catalog_store::{CatalogStore, Result, StoreError};
use storefront_core::model::{
    Advertisement, BookmarkItem, CartItem, Location, Manufacturer, Notification, Order,
    OrderItem, OrderPayment, PaymentProvider, Product, ProductColor, ProductSize, Review, User,
    UserPaymentProvider,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Clone, Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    manufacturers: BTreeMap<i64, Manufacturer>,
    advertisements: BTreeMap<i64, Advertisement>,
    products: BTreeMap<i64, Product>,
    // Insertion order is the read order for variants.
    colors: Vec<ProductColor>,
    sizes: Vec<ProductSize>,
    payment_providers: BTreeMap<String, PaymentProvider>,
    user_payment_providers: Vec<UserPaymentProvider>,
    locations: BTreeMap<i64, Location>,
    reviews: BTreeMap<i64, Review>,
    cart_items: BTreeMap<i64, CartItem>,
    bookmarks: BTreeMap<i64, BookmarkItem>,
    orders: BTreeMap<String, Order>,
    order_items: BTreeMap<i64, OrderItem>,
    order_payments: BTreeMap<String, OrderPayment>,
    notifications: BTreeMap<i64, Notification>,
}

fn conflict(entity: &'static str, key: impl ToString) -> StoreError {
    StoreError::Conflict {
        entity,
        key: key.to_string(),
    }
}

fn dangling(entity: &'static str, detail: String) -> StoreError {
    StoreError::ForeignKeyViolation { entity, detail }
}

impl Tables {
    fn require_user(&self, entity: &'static str, user_id: i64) -> Result<()> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(dangling(entity, format!("user {user_id} does not exist")))
        }
    }

    fn require_product(&self, entity: &'static str, product_id: i64) -> Result<()> {
        if self.products.contains_key(&product_id) {
            Ok(())
        } else {
            Err(dangling(entity, format!("product {product_id} does not exist")))
        }
    }

    fn insert_manufacturer(&mut self, manufacturer: &Manufacturer) -> Result<()> {
        if self.manufacturers.contains_key(&manufacturer.id) {
            return Err(conflict("manufacturers", manufacturer.id));
        }
        let mut row = manufacturer.clone();
        row.products.clear();
        self.manufacturers.insert(row.id, row);
        Ok(())
    }

    fn insert_product(&mut self, product: &Product) -> Result<()> {
        if !self.manufacturers.contains_key(&product.manufacturer_id) {
            return Err(dangling(
                "products",
                format!("manufacturer {} does not exist", product.manufacturer_id),
            ));
        }
        if self.products.contains_key(&product.id) {
            return Err(conflict("products", product.id));
        }
        let mut row = product.clone();
        row.manufacturer = None;
        row.colors.clear();
        row.sizes.clear();
        row.reviews.clear();
        self.products.insert(row.id, row);
        Ok(())
    }

    fn insert_color(&mut self, color: &ProductColor) -> Result<()> {
        self.require_product("product_colors", color.product_id)?;
        if self
            .colors
            .iter()
            .any(|c| c.product_id == color.product_id && c.color_name == color.color_name)
        {
            return Err(conflict(
                "product_colors",
                format!("{}/{}", color.product_id, color.color_name),
            ));
        }
        self.colors.push(color.clone());
        Ok(())
    }

    fn insert_size(&mut self, size: &ProductSize) -> Result<()> {
        self.require_product("product_sizes", size.product_id)?;
        if self.sizes.contains(size) {
            return Err(conflict(
                "product_sizes",
                format!("{}/{}", size.product_id, size.size),
            ));
        }
        self.sizes.push(*size);
        Ok(())
    }

    fn insert_order(
        &mut self,
        order: &Order,
        items: &[OrderItem],
        payment: Option<&OrderPayment>,
    ) -> Result<()> {
        self.require_user("orders", order.user_id)?;
        if self.orders.contains_key(&order.id) {
            return Err(conflict("orders", &order.id));
        }
        let mut row = order.clone();
        row.items.clear();
        row.payment = None;
        self.orders.insert(row.id.clone(), row);

        for item in items {
            if item.order_id != order.id {
                return Err(dangling(
                    "order_items",
                    format!("order {} does not exist", item.order_id),
                ));
            }
            self.require_product("order_items", item.product_id)?;
            if self.order_items.contains_key(&item.id) {
                return Err(conflict("order_items", item.id));
            }
            self.order_items.insert(item.id, item.clone());
        }

        if let Some(payment) = payment {
            if payment.order_id != order.id {
                return Err(dangling(
                    "order_payments",
                    format!("order {} does not exist", payment.order_id),
                ));
            }
            if !self.payment_providers.contains_key(&payment.provider_id) {
                return Err(dangling(
                    "order_payments",
                    format!("payment provider {} does not exist", payment.provider_id),
                ));
            }
            self.order_payments
                .insert(payment.order_id.clone(), payment.clone());
        }
        Ok(())
    }

    fn product_bundle(&self, product: &Product) -> ProductBundle {
        ProductBundle {
            product: product.clone(),
            manufacturer: self.manufacturers.get(&product.manufacturer_id).cloned(),
            colors: self
                .colors
                .iter()
                .filter(|c| c.product_id == product.id)
                .cloned()
                .collect(),
            sizes: self
                .sizes
                .iter()
                .filter(|s| s.product_id == product.id)
                .copied()
                .collect(),
            reviews: self
                .reviews
                .values()
                .filter(|r| r.product_id == product.id)
                .cloned()
                .collect(),
        }
    }

    fn bundle_for(&self, product_id: i64) -> Option<ProductBundle> {
        self.products.get(&product_id).map(|p| self.product_bundle(p))
    }
}

/// In-memory catalog store for fast, deterministic testing.
///
/// Cloning the store shares the underlying tables, so a clone handed to the
/// code under test can be inspected afterwards.
///
/// # Example
///
/// ```
/// use storefront_core::catalog_store::CatalogStore;
/// use storefront_core::{Manufacturer, ResourceRef};
/// use storefront_testing::InMemoryCatalogStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryCatalogStore::new();
/// assert!(store.initialize().await?);
///
/// store
///     .insert_manufacturer(&Manufacturer::new(1, "Single", ResourceRef::drawable("ic_run")))
///     .await?;
/// assert_eq!(store.manufacturers_with_products().await?.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalogStore {
    tables: Arc<RwLock<Tables>>,
    initialized: Arc<AtomicBool>,
}

impl InMemoryCatalogStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every row (for test isolation).
    ///
    /// The store stays initialized.
    pub fn clear(&self) {
        *self.tables.write().unwrap() = Tables::default();
    }

    /// Drop a product row and its variants, leaving cart, bookmark and order
    /// rows that point at it dangling.
    ///
    /// Bypasses the foreign-key checks so tests can build the bundles a read
    /// returns when a product vanished under a cart entry.
    pub fn forget_product(&self, product_id: i64) {
        let mut tables = self.tables.write().unwrap();
        tables.products.remove(&product_id);
        tables.colors.retain(|c| c.product_id != product_id);
        tables.sizes.retain(|s| s.product_id != product_id);
        tables.reviews.retain(|_, r| r.product_id != product_id);
    }

    /// Number of manufacturer rows.
    #[must_use]
    pub fn manufacturer_count(&self) -> usize {
        self.tables.read().unwrap().manufacturers.len()
    }

    /// Number of product rows.
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.tables.read().unwrap().products.len()
    }

    /// Number of colour variant rows across all products.
    #[must_use]
    pub fn color_count(&self) -> usize {
        self.tables.read().unwrap().colors.len()
    }

    /// Number of size rows across all products.
    #[must_use]
    pub fn size_count(&self) -> usize {
        self.tables.read().unwrap().sizes.len()
    }

    /// Total number of rows in every table.
    #[must_use]
    pub fn row_count(&self) -> usize {
        let t = self.tables.read().unwrap();
        t.users.len()
            + t.manufacturers.len()
            + t.advertisements.len()
            + t.products.len()
            + t.colors.len()
            + t.sizes.len()
            + t.payment_providers.len()
            + t.user_payment_providers.len()
            + t.locations.len()
            + t.reviews.len()
            + t.cart_items.len()
            + t.bookmarks.len()
            + t.orders.len()
            + t.order_items.len()
            + t.order_payments.len()
            + t.notifications.len()
    }

    /// Check if no rows are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Apply `write` to a staged copy of the tables and commit it only on
    /// success.
    fn atomically<F>(&self, write: F) -> Result<()>
    where
        F: FnOnce(&mut Tables) -> Result<()>,
    {
        let mut tables = self.tables.write().unwrap();
        let mut staged = tables.clone();
        write(&mut staged)?;
        *tables = staged;
        Ok(())
    }
}

impl CatalogStore for InMemoryCatalogStore {
    async fn initialize(&self) -> Result<bool> {
        Ok(!self.initialized.swap(true, Ordering::SeqCst))
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        self.tables
            .write()
            .unwrap()
            .users
            .insert(user.user_id, user.clone());
        Ok(())
    }

    async fn insert_manufacturer(&self, manufacturer: &Manufacturer) -> Result<()> {
        self.tables.write().unwrap().insert_manufacturer(manufacturer)
    }

    async fn insert_advertisement(&self, advertisement: &Advertisement) -> Result<()> {
        let mut tables = self.tables.write().unwrap();
        if tables.advertisements.contains_key(&advertisement.id) {
            return Err(conflict("advertisements", advertisement.id));
        }
        tables
            .advertisements
            .insert(advertisement.id, advertisement.clone());
        Ok(())
    }

    async fn insert_product(&self, product: &Product) -> Result<()> {
        self.tables.write().unwrap().insert_product(product)
    }

    async fn insert_product_color(&self, color: &ProductColor) -> Result<()> {
        self.tables.write().unwrap().insert_color(color)
    }

    async fn insert_product_size(&self, size: &ProductSize) -> Result<()> {
        self.tables.write().unwrap().insert_size(size)
    }

    async fn insert_product_with_variants(
        &self,
        product: &Product,
        colors: &[ProductColor],
        sizes: &[ProductSize],
    ) -> Result<()> {
        self.atomically(|t| {
            t.insert_product(product)?;
            colors.iter().try_for_each(|c| t.insert_color(c))?;
            sizes.iter().try_for_each(|s| t.insert_size(s))
        })
    }

    async fn save_payment_provider(&self, provider: &PaymentProvider) -> Result<()> {
        self.tables
            .write()
            .unwrap()
            .payment_providers
            .insert(provider.id.clone(), provider.clone());
        Ok(())
    }

    async fn save_user_payment_provider(&self, link: &UserPaymentProvider) -> Result<()> {
        let mut tables = self.tables.write().unwrap();
        if !tables.payment_providers.contains_key(&link.provider_id) {
            return Err(dangling(
                "user_payment_providers",
                format!("payment provider {} does not exist", link.provider_id),
            ));
        }
        if !tables.user_payment_providers.contains(link) {
            tables.user_payment_providers.push(link.clone());
        }
        Ok(())
    }

    async fn save_location(&self, location: &Location) -> Result<()> {
        self.tables
            .write()
            .unwrap()
            .locations
            .insert(location.id, location.clone());
        Ok(())
    }

    async fn insert_review(&self, review: &Review) -> Result<()> {
        let mut tables = self.tables.write().unwrap();
        tables.require_product("reviews", review.product_id)?;
        tables.require_user("reviews", review.user_id)?;
        if tables.reviews.contains_key(&review.id) {
            return Err(conflict("reviews", review.id));
        }
        tables.reviews.insert(review.id, review.clone());
        Ok(())
    }

    async fn add_cart_item(&self, item: &CartItem) -> Result<()> {
        let mut tables = self.tables.write().unwrap();
        tables.require_product("cart_items", item.product_id)?;
        tables.require_user("cart_items", item.user_id)?;
        if tables.cart_items.contains_key(&item.id) {
            return Err(conflict("cart_items", item.id));
        }
        let mut row = item.clone();
        row.product = None;
        tables.cart_items.insert(row.id, row);
        Ok(())
    }

    async fn remove_cart_item(&self, id: i64) -> Result<()> {
        self.tables
            .write()
            .unwrap()
            .cart_items
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                entity: "cart_items",
                key: id.to_string(),
            })
    }

    async fn add_bookmark(&self, item: &BookmarkItem) -> Result<()> {
        let mut tables = self.tables.write().unwrap();
        tables.require_product("bookmark_items", item.product_id)?;
        tables.require_user("bookmark_items", item.user_id)?;
        if tables.bookmarks.contains_key(&item.id) {
            return Err(conflict("bookmark_items", item.id));
        }
        tables.bookmarks.insert(item.id, *item);
        Ok(())
    }

    async fn remove_bookmark(&self, id: i64) -> Result<()> {
        self.tables
            .write()
            .unwrap()
            .bookmarks
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                entity: "bookmark_items",
                key: id.to_string(),
            })
    }

    async fn place_order(
        &self,
        order: &Order,
        items: &[OrderItem],
        payment: Option<&OrderPayment>,
    ) -> Result<()> {
        self.atomically(|t| t.insert_order(order, items, payment))
    }

    async fn save_notification(&self, notification: &Notification) -> Result<()> {
        let mut tables = self.tables.write().unwrap();
        tables.require_user("notifications", notification.user_id)?;
        tables
            .notifications
            .insert(notification.id, notification.clone());
        Ok(())
    }

    async fn user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.tables.read().unwrap().users.get(&user_id).cloned())
    }

    async fn user_by_login(&self, login: &str) -> Result<Option<User>> {
        Ok(self
            .tables
            .read()
            .unwrap()
            .users
            .values()
            .find(|u| u.email == login || u.phone == login)
            .cloned())
    }

    async fn location(&self) -> Result<Option<Location>> {
        Ok(self
            .tables
            .read()
            .unwrap()
            .locations
            .values()
            .next()
            .cloned())
    }

    async fn advertisements(&self) -> Result<Vec<Advertisement>> {
        let mut ads: Vec<_> = self
            .tables
            .read()
            .unwrap()
            .advertisements
            .values()
            .cloned()
            .collect();
        ads.sort_by_key(|a| (a.rank, a.id));
        Ok(ads)
    }

    async fn payment_providers(&self) -> Result<Vec<PaymentProvider>> {
        Ok(self
            .tables
            .read()
            .unwrap()
            .payment_providers
            .values()
            .cloned()
            .collect())
    }

    async fn user_payment_providers(&self) -> Result<Vec<UserPaymentProvider>> {
        let mut links = self.tables.read().unwrap().user_payment_providers.clone();
        links.sort_by(|a, b| {
            (&a.provider_id, &a.card_number).cmp(&(&b.provider_id, &b.card_number))
        });
        Ok(links)
    }

    async fn manufacturers_with_products(&self) -> Result<Vec<ManufacturerBundle>> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .manufacturers
            .values()
            .map(|m| ManufacturerBundle {
                manufacturer: m.clone(),
                products: tables
                    .products
                    .values()
                    .filter(|p| p.manufacturer_id == m.id)
                    .map(|p| tables.product_bundle(p))
                    .collect(),
            })
            .collect())
    }

    async fn product_bundles(&self) -> Result<Vec<ProductBundle>> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .products
            .values()
            .map(|p| tables.product_bundle(p))
            .collect())
    }

    async fn product_bundle(&self, product_id: i64) -> Result<Option<ProductBundle>> {
        Ok(self.tables.read().unwrap().bundle_for(product_id))
    }

    async fn cart_items(&self, user_id: i64) -> Result<Vec<CartItemBundle>> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .cart_items
            .values()
            .filter(|c| c.user_id == user_id)
            .map(|c| CartItemBundle {
                item: c.clone(),
                product: tables.bundle_for(c.product_id),
            })
            .collect())
    }

    async fn bookmark_items(&self, user_id: i64) -> Result<Vec<BookmarkItemBundle>> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .bookmarks
            .values()
            .filter(|b| b.user_id == user_id)
            .map(|b| BookmarkItemBundle {
                item: *b,
                product: tables.bundle_for(b.product_id),
            })
            .collect())
    }

    async fn orders(&self, user_id: i64) -> Result<Vec<OrderBundle>> {
        let tables = self.tables.read().unwrap();
        let mut orders: Vec<_> = tables
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .map(|o| OrderBundle {
                order: o.clone(),
                items: tables
                    .order_items
                    .values()
                    .filter(|i| i.order_id == o.id)
                    .cloned()
                    .collect(),
                payment: tables.order_payments.get(&o.id).cloned(),
            })
            .collect();
        orders.sort_by(|a, b| {
            b.order
                .created_at
                .cmp(&a.order.created_at)
                .then_with(|| a.order.id.cmp(&b.order.id))
        });
        Ok(orders)
    }

    async fn notifications(&self, user_id: i64) -> Result<Vec<Notification>> {
        let mut notifications: Vec<_> = self
            .tables
            .read()
            .unwrap()
            .notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(notifications)
    }
}
