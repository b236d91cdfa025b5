//! Tests for `CatalogView` over the in-memory store.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use storefront_core::catalog_store::CatalogStore;
use storefront_core::seed::SeedCatalog;
use storefront_projections::{CatalogView, ProjectionError};
use storefront_testing::{InMemoryCatalogStore, fixtures};

async fn demo_view() -> CatalogView<InMemoryCatalogStore> {
    let store = InMemoryCatalogStore::new();
    fixtures::load_catalog(&store, &SeedCatalog::demo())
        .await
        .expect("Failed to load demo catalog");
    CatalogView::new(store)
}

#[tokio::test]
async fn test_manufacturers_carry_projected_products() {
    let view = demo_view().await;

    let manufacturers = view.manufacturers().await.unwrap();

    let names: Vec<_> = manufacturers.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["For Family", "Single", "Student", "Vacation"]);

    let family = &manufacturers[0];
    let ids: Vec<_> = family.products.iter().map(|p| p.id).collect();
    assert_eq!(ids, [1, 3, 7]);
    assert!(family.products.iter().all(|p| !p.colors.is_empty()));
    assert!(manufacturers[2].products.is_empty());
}

#[tokio::test]
async fn test_products_have_variants_attached() {
    let view = demo_view().await;

    let products = view.products().await.unwrap();
    let colours: Vec<_> = products.iter().map(|p| (p.id, p.colors.len())).collect();
    assert_eq!(colours, [(1, 2), (3, 4), (7, 3), (10, 2), (12, 3)]);

    let product = view.product(3).await.unwrap().unwrap();
    let names: Vec<_> = product.colors.iter().map(|c| c.color_name.as_str()).collect();
    assert_eq!(names, ["gold", "gray", "pink", "red"]);
    assert_eq!(product.manufacturer.unwrap().name, "For Family");
    assert!(view.product(404).await.unwrap().is_none());
}

#[tokio::test]
async fn test_cart_and_bookmarks() {
    let view = demo_view().await;
    view.store()
        .add_cart_item(&fixtures::cart_item(1, 10, 1))
        .await
        .unwrap();
    view.store()
        .add_bookmark(&fixtures::bookmark(1, 12, 1))
        .await
        .unwrap();

    let cart = view.cart(1).await.unwrap();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].product.as_ref().unwrap().colors.len(), 2);

    let bookmarks = view.bookmarks(1).await.unwrap();
    assert_eq!(bookmarks.iter().map(|p| p.id).collect::<Vec<_>>(), [12]);
}

#[tokio::test]
async fn test_orders_projected_newest_first() {
    let view = demo_view().await;
    let store = view.store();
    store
        .place_order(
            &fixtures::order("old", 1, 0),
            &[fixtures::order_item(1, "old", 1, 1)],
            None,
        )
        .await
        .unwrap();
    store
        .place_order(
            &fixtures::order("new", 1, 5),
            &[fixtures::order_item(2, "new", 7, 3)],
            Some(&fixtures::order_payment("new", "master", 96000.0)),
        )
        .await
        .unwrap();

    let orders = view.orders(1).await.unwrap();

    assert_eq!(orders[0].id, "new");
    assert_eq!(orders[0].items[0].quantity, 3);
    assert!(orders[0].payment.is_some());
    assert!(orders[1].payment.is_none());
}

#[tokio::test]
async fn test_pass_through_reads() {
    let view = demo_view().await;

    assert_eq!(view.advertisements().await.unwrap().len(), 4);
    assert_eq!(view.payment_providers().await.unwrap().len(), 3);
    assert_eq!(view.user_payment_providers().await.unwrap().len(), 3);
    assert_eq!(view.user(1).await.unwrap().unwrap().name, "Merwan");
    assert_eq!(view.location().await.unwrap().unwrap().city, "Khartoum");
    assert!(view.notifications(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_authenticate_by_email_or_phone() {
    let view = demo_view().await;

    let by_email = view
        .authenticate("merwan@example.com", "12344321")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.user_id, 1);

    let by_phone = view.authenticate(" +249922943879 ", "12344321").await.unwrap();
    assert_eq!(by_phone.map(|u| u.user_id), Some(1));
}

#[tokio::test]
async fn test_authenticate_rejects_bad_credentials() {
    let view = demo_view().await;

    assert!(view.authenticate("merwan@example.com", "wrong").await.unwrap().is_none());
    assert!(view.authenticate("merwan@example.com", "").await.unwrap().is_none());
    assert!(view.authenticate("nobody@example.com", "12344321").await.unwrap().is_none());
    assert!(view.authenticate("", "12344321").await.unwrap().is_none());
}

#[tokio::test]
async fn test_empty_store_reads_are_empty_not_errors() {
    let view = CatalogView::new(InMemoryCatalogStore::new());

    assert!(view.manufacturers().await.unwrap().is_empty());
    assert!(view.products().await.unwrap().is_empty());
    assert!(view.cart(1).await.unwrap().is_empty());
    assert!(view.user(1).await.unwrap().is_none());
}

#[tokio::test]
async fn test_cart_with_missing_product_fails_fast() {
    let view = demo_view().await;
    view.store()
        .add_cart_item(&fixtures::cart_item(9, 1, 1))
        .await
        .unwrap();
    view.store().forget_product(1);

    let err = view.cart(1).await.unwrap_err();

    assert_eq!(
        err,
        ProjectionError::MissingParent {
            bundle: "cart item",
            key: "9".to_string()
        }
    );
}

#[tokio::test]
async fn test_bookmark_with_missing_product_fails_fast() {
    let view = demo_view().await;
    view.store()
        .add_bookmark(&fixtures::bookmark(3, 7, 1))
        .await
        .unwrap();
    view.store().forget_product(7);

    assert!(matches!(
        view.bookmarks(1).await,
        Err(ProjectionError::MissingParent { .. })
    ));
}
