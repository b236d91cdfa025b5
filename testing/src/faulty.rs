//! Fault injection for catalog stores.
//!
//! [`FaultyStore`] wraps any [`CatalogStore`] and makes selected seed writes
//! fail or panic, or slows every write down. Reads always pass straight
//! through, which lets tests observe a store while a slow seed is in flight.

use std::fmt;
use std::time::Duration;
use storefront_core::bundle::{
    BookmarkItemBundle, CartItemBundle, ManufacturerBundle, OrderBundle, ProductBundle,
};
use storefront_core::catalog_store::{CatalogStore, Result, StoreError};
use storefront_core::model::{
    Advertisement, BookmarkItem, CartItem, Location, Manufacturer, Notification, Order,
    OrderItem, OrderPayment, PaymentProvider, Product, ProductColor, ProductSize, Review, User,
    UserPaymentProvider,
};

/// A seed write that can be made to misbehave.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FailPoint {
    /// `save_user`
    User,
    /// `insert_manufacturer` for the given id
    Manufacturer(i64),
    /// `insert_advertisement` for the given id
    Advertisement(i64),
    /// `insert_product` or `insert_product_with_variants` for the given id
    Product(i64),
    /// `save_payment_provider` for the given provider key
    PaymentProvider(String),
    /// `save_user_payment_provider` for the given provider key
    UserPaymentProvider(String),
    /// `save_location`
    Location,
}

impl fmt::Display for FailPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Manufacturer(id) => write!(f, "manufacturer {id}"),
            Self::Advertisement(id) => write!(f, "advertisement {id}"),
            Self::Product(id) => write!(f, "product {id}"),
            Self::PaymentProvider(id) => write!(f, "payment provider {id}"),
            Self::UserPaymentProvider(id) => write!(f, "user payment provider {id}"),
            Self::Location => f.write_str("location"),
        }
    }
}

/// Store wrapper that injects failures, panics and latency into writes.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use storefront_testing::{FailPoint, FaultyStore, InMemoryCatalogStore};
///
/// let inner = InMemoryCatalogStore::new();
/// let store = FaultyStore::new(inner.clone())
///     .fail_on(FailPoint::Manufacturer(2))
///     .with_write_delay(Duration::from_millis(5));
/// assert_eq!(store.inner().product_count(), 0);
/// ```
#[derive(Clone, Debug)]
pub struct FaultyStore<S> {
    inner: S,
    failures: Vec<FailPoint>,
    panics: Vec<FailPoint>,
    write_delay: Option<Duration>,
}

impl<S: CatalogStore> FaultyStore<S> {
    /// Wrap `inner` without any faults configured.
    #[must_use]
    pub const fn new(inner: S) -> Self {
        Self {
            inner,
            failures: Vec::new(),
            panics: Vec::new(),
            write_delay: None,
        }
    }

    /// Make the write at `point` return [`StoreError::Database`].
    #[must_use]
    pub fn fail_on(mut self, point: FailPoint) -> Self {
        self.failures.push(point);
        self
    }

    /// Make the write at `point` panic.
    #[must_use]
    pub fn panic_on(mut self, point: FailPoint) -> Self {
        self.panics.push(point);
        self
    }

    /// Sleep for `delay` before every write.
    #[must_use]
    pub const fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }

    /// The wrapped store.
    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    #[allow(clippy::panic)] // Panicking is the injected fault
    async fn before_write(&self, point: Option<FailPoint>) -> Result<()> {
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
        let Some(point) = point else {
            return Ok(());
        };
        if self.panics.contains(&point) {
            panic!("injected panic at {point}");
        }
        if self.failures.contains(&point) {
            return Err(StoreError::Database(format!("injected failure at {point}")));
        }
        Ok(())
    }
}

impl<S: CatalogStore> CatalogStore for FaultyStore<S> {
    async fn initialize(&self) -> Result<bool> {
        self.inner.initialize().await
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        self.before_write(Some(FailPoint::User)).await?;
        self.inner.save_user(user).await
    }

    async fn insert_manufacturer(&self, manufacturer: &Manufacturer) -> Result<()> {
        self.before_write(Some(FailPoint::Manufacturer(manufacturer.id)))
            .await?;
        self.inner.insert_manufacturer(manufacturer).await
    }

    async fn insert_advertisement(&self, advertisement: &Advertisement) -> Result<()> {
        self.before_write(Some(FailPoint::Advertisement(advertisement.id)))
            .await?;
        self.inner.insert_advertisement(advertisement).await
    }

    async fn insert_product(&self, product: &Product) -> Result<()> {
        self.before_write(Some(FailPoint::Product(product.id))).await?;
        self.inner.insert_product(product).await
    }

    async fn insert_product_color(&self, color: &ProductColor) -> Result<()> {
        self.before_write(None).await?;
        self.inner.insert_product_color(color).await
    }

    async fn insert_product_size(&self, size: &ProductSize) -> Result<()> {
        self.before_write(None).await?;
        self.inner.insert_product_size(size).await
    }

    async fn insert_product_with_variants(
        &self,
        product: &Product,
        colors: &[ProductColor],
        sizes: &[ProductSize],
    ) -> Result<()> {
        self.before_write(Some(FailPoint::Product(product.id))).await?;
        self.inner
            .insert_product_with_variants(product, colors, sizes)
            .await
    }

    async fn save_payment_provider(&self, provider: &PaymentProvider) -> Result<()> {
        self.before_write(Some(FailPoint::PaymentProvider(provider.id.clone())))
            .await?;
        self.inner.save_payment_provider(provider).await
    }

    async fn save_user_payment_provider(&self, link: &UserPaymentProvider) -> Result<()> {
        self.before_write(Some(FailPoint::UserPaymentProvider(
            link.provider_id.clone(),
        )))
        .await?;
        self.inner.save_user_payment_provider(link).await
    }

    async fn save_location(&self, location: &Location) -> Result<()> {
        self.before_write(Some(FailPoint::Location)).await?;
        self.inner.save_location(location).await
    }

    async fn insert_review(&self, review: &Review) -> Result<()> {
        self.before_write(None).await?;
        self.inner.insert_review(review).await
    }

    async fn add_cart_item(&self, item: &CartItem) -> Result<()> {
        self.before_write(None).await?;
        self.inner.add_cart_item(item).await
    }

    async fn remove_cart_item(&self, id: i64) -> Result<()> {
        self.before_write(None).await?;
        self.inner.remove_cart_item(id).await
    }

    async fn add_bookmark(&self, item: &BookmarkItem) -> Result<()> {
        self.before_write(None).await?;
        self.inner.add_bookmark(item).await
    }

    async fn remove_bookmark(&self, id: i64) -> Result<()> {
        self.before_write(None).await?;
        self.inner.remove_bookmark(id).await
    }

    async fn place_order(
        &self,
        order: &Order,
        items: &[OrderItem],
        payment: Option<&OrderPayment>,
    ) -> Result<()> {
        self.before_write(None).await?;
        self.inner.place_order(order, items, payment).await
    }

    async fn save_notification(&self, notification: &Notification) -> Result<()> {
        self.before_write(None).await?;
        self.inner.save_notification(notification).await
    }

    async fn user(&self, user_id: i64) -> Result<Option<User>> {
        self.inner.user(user_id).await
    }

    async fn user_by_login(&self, login: &str) -> Result<Option<User>> {
        self.inner.user_by_login(login).await
    }

    async fn location(&self) -> Result<Option<Location>> {
        self.inner.location().await
    }

    async fn advertisements(&self) -> Result<Vec<Advertisement>> {
        self.inner.advertisements().await
    }

    async fn payment_providers(&self) -> Result<Vec<PaymentProvider>> {
        self.inner.payment_providers().await
    }

    async fn user_payment_providers(&self) -> Result<Vec<UserPaymentProvider>> {
        self.inner.user_payment_providers().await
    }

    async fn manufacturers_with_products(&self) -> Result<Vec<ManufacturerBundle>> {
        self.inner.manufacturers_with_products().await
    }

    async fn product_bundles(&self) -> Result<Vec<ProductBundle>> {
        self.inner.product_bundles().await
    }

    async fn product_bundle(&self, product_id: i64) -> Result<Option<ProductBundle>> {
        self.inner.product_bundle(product_id).await
    }

    async fn cart_items(&self, user_id: i64) -> Result<Vec<CartItemBundle>> {
        self.inner.cart_items(user_id).await
    }

    async fn bookmark_items(&self, user_id: i64) -> Result<Vec<BookmarkItemBundle>> {
        self.inner.bookmark_items(user_id).await
    }

    async fn orders(&self, user_id: i64) -> Result<Vec<OrderBundle>> {
        self.inner.orders(user_id).await
    }

    async fn notifications(&self, user_id: i64) -> Result<Vec<Notification>> {
        self.inner.notifications(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::InMemoryCatalogStore;
    use storefront_core::ResourceRef;

    #[tokio::test]
    async fn test_fail_point_only_hits_matching_key() {
        let store = FaultyStore::new(InMemoryCatalogStore::new()).fail_on(FailPoint::Manufacturer(2));

        store
            .insert_manufacturer(&Manufacturer::new(1, "For Family", ResourceRef::drawable("a")))
            .await
            .unwrap();
        let err = store
            .insert_manufacturer(&Manufacturer::new(2, "Single", ResourceRef::drawable("b")))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            StoreError::Database("injected failure at manufacturer 2".to_string())
        );
        assert_eq!(store.inner().manufacturer_count(), 1);
    }

    #[test]
    fn test_fail_point_display() {
        assert_eq!(FailPoint::Product(3).to_string(), "product 3");
        assert_eq!(
            FailPoint::PaymentProvider("visa".to_string()).to_string(),
            "payment provider visa"
        );
    }
}
