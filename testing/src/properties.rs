//! Proptest strategies for bundles.
//!
//! Generated bundles are internally consistent: child rows point at their
//! parent and colour names are unique per product, matching what a store can
//! return.

use crate::fixtures;
use proptest::collection::{hash_set, vec};
use proptest::prelude::*;
use storefront_core::bundle::{
    BookmarkItemBundle, CartItemBundle, ManufacturerBundle, OrderBundle, ProductBundle,
};
use storefront_core::model::{ProductSize, Review};

const COLOR_NAMES: &[&str] = &[
    "black", "dark-green", "gold", "gray", "green", "lemon", "pink", "red",
];

/// A product bundle with a manufacturer, 0-8 distinct colours, 0-3 sizes and
/// 0-3 reviews.
pub fn arb_product_bundle() -> impl Strategy<Value = ProductBundle> {
    (
        1..10_000i64,
        1..100i64,
        hash_set(0..COLOR_NAMES.len(), 0..=COLOR_NAMES.len()),
        hash_set(30..50i64, 0..=3),
        vec((1..=5i32, "[a-z ]{0,20}"), 0..=3),
    )
        .prop_map(|(id, manufacturer_id, color_idx, sizes, reviews)| {
            let mut color_idx: Vec<_> = color_idx.into_iter().collect();
            color_idx.sort_unstable();
            let names: Vec<&str> = color_idx.into_iter().map(|i| COLOR_NAMES[i]).collect();
            let mut sizes: Vec<_> = sizes.into_iter().collect();
            sizes.sort_unstable();

            let mut bundle = fixtures::product_bundle(id, manufacturer_id, &names);
            bundle.sizes = sizes.into_iter().map(|s| ProductSize::new(id, s)).collect();
            bundle.reviews = reviews
                .into_iter()
                .zip(1..)
                .map(|((rating, comment), review_id)| Review {
                    rating,
                    comment,
                    ..fixtures::review(review_id, id, 1)
                })
                .collect();
            bundle
        })
}

/// A manufacturer bundle whose products all belong to it.
pub fn arb_manufacturer_bundle() -> impl Strategy<Value = ManufacturerBundle> {
    (1..100i64, vec(arb_product_bundle(), 0..5)).prop_map(|(id, products)| {
        let manufacturer = fixtures::manufacturer(id);
        let products = products
            .into_iter()
            .map(|mut bundle| {
                bundle.product.manufacturer_id = id;
                bundle.manufacturer = Some(manufacturer.clone());
                bundle
            })
            .collect();
        ManufacturerBundle {
            manufacturer,
            products,
        }
    })
}

/// A cart bundle whose product is always present.
pub fn arb_cart_item_bundle() -> impl Strategy<Value = CartItemBundle> {
    (1..10_000i64, 1..10i64, arb_product_bundle()).prop_map(|(id, quantity, product)| {
        let mut item = fixtures::cart_item(id, product.product.id, 1);
        item.quantity = quantity;
        CartItemBundle {
            item,
            product: Some(product),
        }
    })
}

/// A bookmark bundle whose product is always present.
pub fn arb_bookmark_item_bundle() -> impl Strategy<Value = BookmarkItemBundle> {
    (1..10_000i64, arb_product_bundle()).prop_map(|(id, product)| BookmarkItemBundle {
        item: fixtures::bookmark(id, product.product.id, 1),
        product: Some(product),
    })
}

/// An order bundle with 0-4 lines and an optional payment.
pub fn arb_order_bundle() -> impl Strategy<Value = OrderBundle> {
    (
        "[a-z0-9]{8}",
        0..1_000i64,
        vec((1..100i64, 1..5i64), 0..=4),
        any::<bool>(),
    )
        .prop_map(|(id, minutes, lines, paid)| {
            let items: Vec<_> = lines
                .into_iter()
                .zip(1..)
                .map(|((product_id, quantity), line_id)| {
                    fixtures::order_item(line_id, &id, product_id, quantity)
                })
                .collect();
            let payment = paid.then(|| fixtures::order_payment(&id, "visa", 10.0));
            OrderBundle {
                order: fixtures::order(&id, 1, minutes),
                items,
                payment,
            }
        })
}
