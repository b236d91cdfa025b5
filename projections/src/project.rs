//! Pure bundle-to-view transforms.
//!
//! Each bundle type knows how to turn itself into the nested object display
//! code consumes. Projection never touches storage and never mutates its
//! input: the view is a fresh value, so projecting the same bundle twice
//! yields equal results.

use crate::error::{ProjectionError, Result};
use storefront_core::bundle::{
    BookmarkItemBundle, CartItemBundle, ManufacturerBundle, OrderBundle, ProductBundle,
};
use storefront_core::model::{CartItem, Manufacturer, Order, Product};

/// Conversion from a join-shaped bundle to a nested display object.
///
/// # Example
///
/// ```
/// use storefront_core::{Product, ProductBundle, ProductColor, ResourceRef};
/// use storefront_projections::Project;
///
/// let product = Product::new(3, "Flat", ResourceRef::drawable("image06"), 15000.0, "", 1, "gold");
/// let mut bundle = ProductBundle::new(product);
/// bundle.colors.push(ProductColor::new(3, "gold", ResourceRef::drawable("image06")));
///
/// let view = bundle.project().unwrap();
/// assert_eq!(view.colors.len(), 1);
/// ```
pub trait Project {
    /// The nested object this bundle projects to.
    type View;

    /// Build the view.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::MissingParent`] if a nested parent the view
    /// cannot do without is absent.
    fn project(&self) -> Result<Self::View>;
}

/// Project every bundle, preserving input order.
///
/// # Errors
///
/// Returns the first projection error; no partial result is returned.
pub fn project_all<B: Project>(bundles: &[B]) -> Result<Vec<B::View>> {
    bundles.iter().map(Project::project).collect()
}

impl Project for ProductBundle {
    type View = Product;

    fn project(&self) -> Result<Product> {
        let mut product = self.product.clone();
        product.manufacturer.clone_from(&self.manufacturer);
        product.colors.clone_from(&self.colors);
        product.sizes.clone_from(&self.sizes);
        product.reviews.clone_from(&self.reviews);
        Ok(product)
    }
}

impl Project for ManufacturerBundle {
    type View = Manufacturer;

    fn project(&self) -> Result<Manufacturer> {
        let mut manufacturer = self.manufacturer.clone();
        manufacturer.products = project_all(&self.products)?;
        Ok(manufacturer)
    }
}

impl Project for CartItemBundle {
    type View = CartItem;

    fn project(&self) -> Result<CartItem> {
        let product = self
            .product
            .as_ref()
            .ok_or_else(|| ProjectionError::MissingParent {
                bundle: "cart item",
                key: self.item.id.to_string(),
            })?
            .project()?;
        let mut item = self.item.clone();
        item.product = Some(product);
        Ok(item)
    }
}

impl Project for BookmarkItemBundle {
    type View = Product;

    fn project(&self) -> Result<Product> {
        self.product
            .as_ref()
            .ok_or_else(|| ProjectionError::MissingParent {
                bundle: "bookmark item",
                key: self.item.id.to_string(),
            })?
            .project()
    }
}

impl Project for OrderBundle {
    type View = Order;

    fn project(&self) -> Result<Order> {
        let mut order = self.order.clone();
        order.items.clone_from(&self.items);
        order.payment.clone_from(&self.payment);
        Ok(order)
    }
}
