//! Property tests for bundle projection.

#![allow(clippy::unwrap_used)] // Tests can unwrap

use proptest::prelude::*;
use storefront_projections::{Project, project_all};
use storefront_testing::properties::{
    arb_bookmark_item_bundle, arb_cart_item_bundle, arb_manufacturer_bundle, arb_order_bundle,
    arb_product_bundle,
};

proptest! {
    #[test]
    fn product_projection_is_idempotent(bundle in arb_product_bundle()) {
        let first = bundle.project().unwrap();
        let second = bundle.project().unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn product_projection_attaches_every_child(bundle in arb_product_bundle()) {
        let product = bundle.project().unwrap();
        prop_assert_eq!(&product.colors, &bundle.colors);
        prop_assert_eq!(&product.sizes, &bundle.sizes);
        prop_assert_eq!(&product.reviews, &bundle.reviews);
        prop_assert_eq!(&product.manufacturer, &bundle.manufacturer);
    }

    #[test]
    fn project_all_preserves_order(bundles in prop::collection::vec(arb_product_bundle(), 0..12)) {
        let products = project_all(&bundles).unwrap();
        prop_assert_eq!(products.len(), bundles.len());
        for (product, bundle) in products.iter().zip(&bundles) {
            prop_assert_eq!(product.id, bundle.product.id);
        }
    }

    #[test]
    fn manufacturer_projection_is_idempotent(bundle in arb_manufacturer_bundle()) {
        let first = bundle.project().unwrap();
        prop_assert_eq!(&first, &bundle.project().unwrap());
        prop_assert_eq!(first.products.len(), bundle.products.len());
    }

    #[test]
    fn cart_projection_keeps_item_fields(bundles in prop::collection::vec(arb_cart_item_bundle(), 0..8)) {
        let items = project_all(&bundles).unwrap();
        prop_assert_eq!(items.len(), bundles.len());
        for (item, bundle) in items.iter().zip(&bundles) {
            prop_assert_eq!(item.id, bundle.item.id);
            prop_assert_eq!(item.quantity, bundle.item.quantity);
            prop_assert_eq!(
                item.product.as_ref().map(|p| p.id),
                Some(bundle.item.product_id)
            );
        }
    }

    #[test]
    fn bookmark_projection_yields_products_in_order(bundles in prop::collection::vec(arb_bookmark_item_bundle(), 0..8)) {
        let products = project_all(&bundles).unwrap();
        let ids: Vec<_> = products.iter().map(|p| p.id).collect();
        let expected: Vec<_> = bundles.iter().map(|b| b.item.product_id).collect();
        prop_assert_eq!(ids, expected);
    }

    #[test]
    fn order_projection_is_idempotent(bundle in arb_order_bundle()) {
        let first = bundle.project().unwrap();
        prop_assert_eq!(&first, &bundle.project().unwrap());
        prop_assert_eq!(&first.items, &bundle.items);
        prop_assert_eq!(&first.payment, &bundle.payment);
    }
}
