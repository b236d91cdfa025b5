//! Read facade that queries bundles and projects them.

use crate::error::Result;
use crate::project::project_all;
use crate::Project;
use storefront_core::catalog_store::CatalogStore;
use storefront_core::model::{
    Advertisement, CartItem, Location, Manufacturer, Notification, Order, PaymentProvider,
    Product, User, UserPaymentProvider,
};

/// Display-ready reads over a [`CatalogStore`].
///
/// Every call queries the store and projects the result; nothing is cached,
/// so a read during seeding returns whatever has been committed so far.
///
/// # Example
///
/// ```
/// use storefront_core::SeedCatalog;
/// use storefront_projections::CatalogView;
/// use storefront_testing::{InMemoryCatalogStore, fixtures};
///
/// # tokio_test::block_on(async {
/// let store = InMemoryCatalogStore::new();
/// fixtures::load_catalog(&store, &SeedCatalog::demo()).await.unwrap();
///
/// let view = CatalogView::new(store);
/// let product = view.product(3).await.unwrap().unwrap();
/// assert_eq!(product.colors.len(), 4);
/// # });
/// ```
#[derive(Clone, Debug)]
pub struct CatalogView<S> {
    store: S,
}

impl<S: CatalogStore> CatalogView<S> {
    /// Create a view over `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Manufacturers with their products attached, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ProjectionError::Store`] if the query fails.
    pub async fn manufacturers(&self) -> Result<Vec<Manufacturer>> {
        let bundles = self.store.manufacturers_with_products().await?;
        let manufacturers = project_all(&bundles)?;
        tracing::debug!(count = manufacturers.len(), "Projected manufacturers");
        Ok(manufacturers)
    }

    /// All products with variants and reviews attached, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ProjectionError::Store`] if the query fails.
    pub async fn products(&self) -> Result<Vec<Product>> {
        let bundles = self.store.product_bundles().await?;
        let products = project_all(&bundles)?;
        tracing::debug!(count = products.len(), "Projected products");
        Ok(products)
    }

    /// One product, if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ProjectionError::Store`] if the query fails.
    pub async fn product(&self, product_id: i64) -> Result<Option<Product>> {
        self.store
            .product_bundle(product_id)
            .await?
            .as_ref()
            .map(Project::project)
            .transpose()
    }

    /// The user's cart with products attached.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ProjectionError::MissingParent`] if a cart row's
    /// product is gone, [`crate::ProjectionError::Store`] if the query fails.
    pub async fn cart(&self, user_id: i64) -> Result<Vec<CartItem>> {
        let bundles = self.store.cart_items(user_id).await?;
        let items = project_all(&bundles).inspect_err(|e| {
            tracing::warn!(user_id, error = %e, "Cart projection failed");
        })?;
        tracing::debug!(user_id, count = items.len(), "Projected cart");
        Ok(items)
    }

    /// The products the user bookmarked.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ProjectionError::MissingParent`] if a bookmarked
    /// product is gone, [`crate::ProjectionError::Store`] if the query fails.
    pub async fn bookmarks(&self, user_id: i64) -> Result<Vec<Product>> {
        let bundles = self.store.bookmark_items(user_id).await?;
        let products = project_all(&bundles).inspect_err(|e| {
            tracing::warn!(user_id, error = %e, "Bookmark projection failed");
        })?;
        tracing::debug!(user_id, count = products.len(), "Projected bookmarks");
        Ok(products)
    }

    /// The user's orders with lines and payment attached, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ProjectionError::Store`] if the query fails.
    pub async fn orders(&self, user_id: i64) -> Result<Vec<Order>> {
        let bundles = self.store.orders(user_id).await?;
        project_all(&bundles)
    }

    /// Advertisements ordered by rank.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ProjectionError::Store`] if the query fails.
    pub async fn advertisements(&self) -> Result<Vec<Advertisement>> {
        Ok(self.store.advertisements().await?)
    }

    /// Supported payment providers.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ProjectionError::Store`] if the query fails.
    pub async fn payment_providers(&self) -> Result<Vec<PaymentProvider>> {
        Ok(self.store.payment_providers().await?)
    }

    /// Cards registered by the local user.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ProjectionError::Store`] if the query fails.
    pub async fn user_payment_providers(&self) -> Result<Vec<UserPaymentProvider>> {
        Ok(self.store.user_payment_providers().await?)
    }

    /// A user by id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ProjectionError::Store`] if the query fails.
    pub async fn user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.store.user(user_id).await?)
    }

    /// Sign in with an email address or phone number and a password.
    ///
    /// Returns the user when the login exists and the password verifies,
    /// `None` otherwise. Unknown logins and wrong passwords are not told
    /// apart.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ProjectionError::Store`] if the query fails.
    #[tracing::instrument(skip_all)]
    pub async fn authenticate(&self, login: &str, password: &str) -> Result<Option<User>> {
        let user = self
            .store
            .user_by_login(login.trim())
            .await?
            .filter(|user| user.verify_password(password));

        match &user {
            Some(user) => tracing::debug!(user_id = user.user_id, "Authenticated"),
            None => tracing::debug!("Authentication failed"),
        }
        Ok(user)
    }

    /// The stored delivery location.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ProjectionError::Store`] if the query fails.
    pub async fn location(&self) -> Result<Option<Location>> {
        Ok(self.store.location().await?)
    }

    /// The user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ProjectionError::Store`] if the query fails.
    pub async fn notifications(&self, user_id: i64) -> Result<Vec<Notification>> {
        Ok(self.store.notifications(user_id).await?)
    }
}
