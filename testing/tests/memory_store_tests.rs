//! Tests for the in-memory catalog store

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use storefront_core::catalog_store::{CatalogStore, StoreError};
use storefront_core::seed::SeedCatalog;
use storefront_testing::{InMemoryCatalogStore, fixtures};

async fn demo_store() -> InMemoryCatalogStore {
    let store = InMemoryCatalogStore::new();
    store.initialize().await.unwrap();
    fixtures::load_catalog(&store, &SeedCatalog::demo())
        .await
        .unwrap();
    store
}

#[tokio::test]
async fn test_initialize_reports_creation_once() {
    let store = InMemoryCatalogStore::new();
    assert!(store.initialize().await.unwrap());
    assert!(!store.initialize().await.unwrap());

    // Clones share state, including the creation flag
    assert!(!store.clone().initialize().await.unwrap());
}

#[tokio::test]
async fn test_demo_catalog_counts() {
    let store = demo_store().await;

    assert_eq!(store.manufacturer_count(), 4);
    assert_eq!(store.product_count(), 5);
    assert_eq!(store.color_count(), 14);
    assert_eq!(store.size_count(), 5);
    assert_eq!(store.advertisements().await.unwrap().len(), 4);
    assert_eq!(store.payment_providers().await.unwrap().len(), 3);
    assert_eq!(store.user_payment_providers().await.unwrap().len(), 3);
    assert!(store.user(1).await.unwrap().is_some());
    assert_eq!(store.location().await.unwrap().unwrap().city, "Khartoum");
}

#[tokio::test]
async fn test_product_rejects_unknown_manufacturer() {
    let store = InMemoryCatalogStore::new();

    let err = store
        .insert_product(&fixtures::product(1, 99))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::ForeignKeyViolation {
            entity: "products",
            ..
        }
    ));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_duplicate_insert_conflicts() {
    let store = InMemoryCatalogStore::new();
    store
        .insert_manufacturer(&fixtures::manufacturer(1))
        .await
        .unwrap();

    let err = store
        .insert_manufacturer(&fixtures::manufacturer(1))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        StoreError::Conflict {
            entity: "manufacturers",
            key: "1".to_string()
        }
    );
}

#[tokio::test]
async fn test_save_upserts() {
    let store = InMemoryCatalogStore::new();
    let mut user = fixtures::user(1);
    store.save_user(&user).await.unwrap();

    user.name = "Renamed".to_string();
    store.save_user(&user).await.unwrap();

    assert_eq!(store.user(1).await.unwrap().unwrap().name, "Renamed");
    assert_eq!(store.row_count(), 1);
}

#[tokio::test]
async fn test_product_with_variants_is_atomic() {
    let store = InMemoryCatalogStore::new();
    store
        .insert_manufacturer(&fixtures::manufacturer(1))
        .await
        .unwrap();

    // Duplicate colour name makes the whole write fail
    let colors = fixtures::colors(5, &["red", "red"]);
    let result = store
        .insert_product_with_variants(&fixtures::product(5, 1), &colors, &[])
        .await;

    assert!(matches!(result, Err(StoreError::Conflict { .. })));
    assert_eq!(store.product_count(), 0);
    assert_eq!(store.color_count(), 0);
}

#[tokio::test]
async fn test_colors_keep_insertion_order() {
    let store = demo_store().await;

    let bundle = store.product_bundle(3).await.unwrap().unwrap();
    let names: Vec<_> = bundle.colors.iter().map(|c| c.color_name.as_str()).collect();

    assert_eq!(names, ["gold", "gray", "pink", "red"]);
    assert_eq!(bundle.manufacturer.unwrap().name, "For Family");
}

#[tokio::test]
async fn test_manufacturers_with_products_groups_by_owner() {
    let store = demo_store().await;

    let bundles = store.manufacturers_with_products().await.unwrap();
    let shape: Vec<_> = bundles
        .iter()
        .map(|b| (b.manufacturer.id, b.products.len()))
        .collect();

    assert_eq!(shape, [(1, 3), (2, 2), (3, 0), (4, 0)]);
}

#[tokio::test]
async fn test_cart_and_bookmark_round_trip() {
    let store = demo_store().await;

    store
        .add_cart_item(&fixtures::cart_item(1, 7, 1))
        .await
        .unwrap();
    store
        .add_bookmark(&fixtures::bookmark(1, 10, 1))
        .await
        .unwrap();

    let cart = store.cart_items(1).await.unwrap();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].product.as_ref().unwrap().product.id, 7);
    assert!(store.cart_items(2).await.unwrap().is_empty());

    store.remove_cart_item(1).await.unwrap();
    assert!(store.cart_items(1).await.unwrap().is_empty());
    assert!(matches!(
        store.remove_cart_item(1).await,
        Err(StoreError::NotFound { .. })
    ));

    let bookmarks = store.bookmark_items(1).await.unwrap();
    assert_eq!(bookmarks[0].item.product_id, 10);
    store.remove_bookmark(1).await.unwrap();
    assert!(store.bookmark_items(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cart_rejects_unknown_user() {
    let store = demo_store().await;

    let err = store
        .add_cart_item(&fixtures::cart_item(1, 7, 42))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::ForeignKeyViolation { .. }));
}

#[tokio::test]
async fn test_place_order_is_atomic_and_newest_first() {
    let store = demo_store().await;

    store
        .place_order(
            &fixtures::order("a", 1, 0),
            &[fixtures::order_item(1, "a", 1, 2)],
            Some(&fixtures::order_payment("a", "visa", 40000.0)),
        )
        .await
        .unwrap();

    // Unknown product in the second line rolls back the whole order
    let result = store
        .place_order(
            &fixtures::order("b", 1, 10),
            &[
                fixtures::order_item(2, "b", 3, 1),
                fixtures::order_item(3, "b", 999, 1),
            ],
            None,
        )
        .await;
    assert!(matches!(result, Err(StoreError::ForeignKeyViolation { .. })));

    store
        .place_order(&fixtures::order("c", 1, 20), &[], None)
        .await
        .unwrap();

    let orders = store.orders(1).await.unwrap();
    let ids: Vec<_> = orders.iter().map(|o| o.order.id.as_str()).collect();
    assert_eq!(ids, ["c", "a"]);
    assert_eq!(orders[1].items.len(), 1);
    assert_eq!(orders[1].payment.as_ref().unwrap().provider_id, "visa");
}

#[tokio::test]
async fn test_reviews_attach_to_product_bundle() {
    let store = demo_store().await;

    store.insert_review(&fixtures::review(1, 12, 1)).await.unwrap();
    let err = store
        .insert_review(&fixtures::review(2, 404, 1))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::ForeignKeyViolation { .. }));
    let bundle = store.product_bundle(12).await.unwrap().unwrap();
    assert_eq!(bundle.reviews.len(), 1);
}

#[tokio::test]
async fn test_notifications_newest_first() {
    let store = demo_store().await;

    store
        .save_notification(&fixtures::notification(1, 1))
        .await
        .unwrap();
    store
        .save_notification(&fixtures::notification(2, 1))
        .await
        .unwrap();

    let ids: Vec<_> = store
        .notifications(1)
        .await
        .unwrap()
        .iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(ids, [2, 1]);
}

#[tokio::test]
async fn test_clear_keeps_store_usable() {
    let store = demo_store().await;
    assert!(!store.is_empty());

    store.clear();

    assert!(store.is_empty());
    assert!(store.product_bundles().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_user_by_login() {
    let store = demo_store().await;

    let user = store.user_by_login("merwan@example.com").await.unwrap().unwrap();
    assert_eq!(user.user_id, 1);
    assert!(user.verify_password("12344321"));
    assert_eq!(
        store.user_by_login("+249922943879").await.unwrap().map(|u| u.user_id),
        Some(1)
    );
    assert!(store.user_by_login("Merwan").await.unwrap().is_none());
}
