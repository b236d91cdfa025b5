//! Record builders and a sequential catalog loader for tests.
//!
//! Timestamps come from [`fixed_time`], so fixtures compare equal across runs.

use chrono::{DateTime, TimeZone, Utc};
use storefront_core::bundle::ProductBundle;
use storefront_core::catalog_store::{CatalogStore, Result};
use storefront_core::model::{
    BookmarkItem, CartItem, Manufacturer, Notification, Order, OrderItem, OrderPayment,
    PaymentProvider, Product, ProductColor, ProductSize, ResourceRef, Review, User,
    hash_password_with_salt,
};
use storefront_core::seed::SeedCatalog;

/// The instant every fixture timestamp is derived from.
#[must_use]
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

/// [`fixed_time`] shifted by `minutes`.
#[must_use]
pub fn time_plus(minutes: i64) -> DateTime<Utc> {
    fixed_time() + chrono::Duration::minutes(minutes)
}

/// A manufacturer named `Manufacturer {id}`.
#[must_use]
pub fn manufacturer(id: i64) -> Manufacturer {
    Manufacturer::new(id, format!("Manufacturer {id}"), ResourceRef::drawable("ic_test"))
}

/// A product priced at `100 * id` with basic colour `gold`.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Test ids are small
pub fn product(id: i64, manufacturer_id: i64) -> Product {
    Product::new(
        id,
        format!("Product {id}"),
        ResourceRef::drawable(&format!("image{id}")),
        100.0 * id as f64,
        "fixture product",
        manufacturer_id,
        "gold",
    )
}

/// Colour rows for `product_id`, one per name, in the given order.
#[must_use]
pub fn colors(product_id: i64, names: &[&str]) -> Vec<ProductColor> {
    names
        .iter()
        .map(|name| {
            ProductColor::new(
                product_id,
                *name,
                ResourceRef::drawable(&format!("image{product_id}_{name}")),
            )
        })
        .collect()
}

/// A product bundle with its manufacturer, the given colours and size 38.
#[must_use]
pub fn product_bundle(id: i64, manufacturer_id: i64, color_names: &[&str]) -> ProductBundle {
    ProductBundle {
        product: product(id, manufacturer_id),
        manufacturer: Some(manufacturer(manufacturer_id)),
        colors: colors(id, color_names),
        sizes: vec![ProductSize::new(id, 38)],
        reviews: Vec::new(),
    }
}

/// A user whose password is `password`, hashed with a fixed salt.
#[must_use]
pub fn user(user_id: i64) -> User {
    User {
        user_id,
        name: format!("User {user_id}"),
        profile: ResourceRef::drawable("ic_profile_empty"),
        phone: "+10000000000".to_string(),
        email: format!("user{user_id}@example.com"),
        password_hash: hash_password_with_salt("password", b"storefront-salt!"),
        token: format!("token-{user_id}"),
    }
}

/// A payment provider keyed `id`.
#[must_use]
pub fn payment_provider(id: &str) -> PaymentProvider {
    PaymentProvider {
        id: id.to_string(),
        title: ResourceRef::string(id),
        icon: ResourceRef::drawable(&format!("ic_{id}")),
    }
}

/// A four-star review.
#[must_use]
pub fn review(id: i64, product_id: i64, user_id: i64) -> Review {
    Review {
        id,
        product_id,
        user_id,
        rating: 4,
        comment: format!("review {id}"),
        created_at: time_plus(id),
    }
}

/// A single-unit cart row.
#[must_use]
pub const fn cart_item(id: i64, product_id: i64, user_id: i64) -> CartItem {
    CartItem::new(id, product_id, user_id, 1)
}

/// A bookmark row.
#[must_use]
pub const fn bookmark(id: i64, product_id: i64, user_id: i64) -> BookmarkItem {
    BookmarkItem {
        id,
        product_id,
        user_id,
    }
}

/// A placed order created `minutes` after [`fixed_time`].
#[must_use]
pub fn order(id: &str, user_id: i64, minutes: i64) -> Order {
    Order {
        id: id.to_string(),
        user_id,
        total: 0.0,
        status: "placed".to_string(),
        created_at: time_plus(minutes),
        items: Vec::new(),
        payment: None,
    }
}

/// An order line.
#[must_use]
pub fn order_item(id: i64, order_id: &str, product_id: i64, quantity: i64) -> OrderItem {
    OrderItem {
        id,
        order_id: order_id.to_string(),
        product_id,
        quantity,
    }
}

/// A payment of `amount` through `provider_id`.
#[must_use]
pub fn order_payment(order_id: &str, provider_id: &str, amount: f64) -> OrderPayment {
    OrderPayment {
        order_id: order_id.to_string(),
        provider_id: provider_id.to_string(),
        amount,
    }
}

/// An unread notification created `id` minutes after [`fixed_time`].
#[must_use]
pub fn notification(id: i64, user_id: i64) -> Notification {
    Notification {
        id,
        user_id,
        title: format!("Notification {id}"),
        body: "fixture".to_string(),
        read: false,
        created_at: time_plus(id),
    }
}

/// Insert `catalog` into `store` one row at a time, parents first.
///
/// This is the plain sequential path used to prepare read-side tests; it does
/// not exercise the concurrent seed loader.
///
/// # Errors
///
/// Returns the first store error encountered.
pub async fn load_catalog<S: CatalogStore>(store: &S, catalog: &SeedCatalog) -> Result<()> {
    store.save_user(catalog.user()).await?;
    for manufacturer in catalog.manufacturers() {
        store.insert_manufacturer(manufacturer).await?;
    }
    for advertisement in catalog.advertisements() {
        store.insert_advertisement(advertisement).await?;
    }
    for provider in catalog.payment_providers() {
        store.save_payment_provider(provider).await?;
    }
    store.save_location(catalog.location()).await?;
    for seed in catalog.products() {
        store
            .insert_product_with_variants(&seed.product, &seed.colors, &seed.sizes)
            .await?;
    }
    for link in catalog.user_payment_providers() {
        store.save_user_payment_provider(link).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_time_is_stable() {
        assert_eq!(fixed_time(), fixed_time());
        assert!(time_plus(5) > fixed_time());
    }

    #[test]
    fn test_product_bundle_fixture_shape() {
        let bundle = product_bundle(3, 1, &["gold", "red"]);
        assert_eq!(bundle.colors.len(), 2);
        assert_eq!(bundle.manufacturer.map(|m| m.id), Some(1));
        assert!(bundle.colors.iter().all(|c| c.product_id == 3));
    }

    #[test]
    fn test_user_fixture_is_deterministic() {
        assert_eq!(user(2), user(2));
        assert!(user(2).verify_password("password"));
    }
}
