//! Opening the catalog: schema creation plus first-run seeding.

use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::seed_loader::{SeedHandle, SeedLoader, SeedReport};
use std::sync::Arc;
use storefront_core::catalog_store::CatalogStore;
use storefront_core::seed::SeedCatalog;
use storefront_projections::CatalogView;
use storefront_sqlite::SqliteCatalogStore;

/// A store that is ready to read, possibly still being seeded.
#[derive(Debug)]
pub struct OpenedCatalog<S> {
    store: Arc<S>,
    created: bool,
    seeding: Option<SeedHandle>,
}

impl<S: CatalogStore + 'static> OpenedCatalog<S> {
    /// The shared store.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Whether the schema was created by this open.
    #[must_use]
    pub const fn was_created(&self) -> bool {
        self.created
    }

    /// A read view over the store.
    ///
    /// Views can be taken at any time; while seeding runs they observe
    /// whatever has been committed so far.
    #[must_use]
    pub fn view(&self) -> CatalogView<Arc<S>> {
        CatalogView::new(Arc::clone(&self.store))
    }

    /// Take the seed handle, leaving `None` behind.
    pub const fn take_seeding(&mut self) -> Option<SeedHandle> {
        self.seeding.take()
    }

    /// Wait for seeding to finish.
    ///
    /// Returns `None` if no seeding was started or the handle was taken.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RuntimeError::SeedTask`] if the seed task was lost.
    pub async fn wait_for_seed(&mut self) -> Result<Option<SeedReport>> {
        match self.seeding.take() {
            Some(handle) => handle.wait().await.map(Some),
            None => Ok(None),
        }
    }
}

/// Initialize `store` and, on first creation, start seeding it with `catalog`.
///
/// Returns as soon as the schema exists; seeding continues in the background.
///
/// # Errors
///
/// Returns [`crate::RuntimeError::Store`] if schema creation fails.
#[tracing::instrument(skip_all, fields(seed_on_create = seed_on_create))]
pub async fn open<S: CatalogStore + 'static>(
    store: S,
    catalog: Arc<SeedCatalog>,
    seed_on_create: bool,
) -> Result<OpenedCatalog<S>> {
    let store = Arc::new(store);
    let created = store.initialize().await?;

    let seeding = if created && seed_on_create {
        tracing::info!("Catalog created, seeding in background");
        Some(SeedLoader::new(Arc::clone(&store), catalog).spawn())
    } else {
        tracing::debug!(created, "Catalog opened without seeding");
        None
    };

    Ok(OpenedCatalog {
        store,
        created,
        seeding,
    })
}

/// Open the `SQLite` catalog described by `config` with the demo dataset.
///
/// # Errors
///
/// Returns [`crate::RuntimeError::Config`] for an invalid configuration and
/// [`crate::RuntimeError::Store`] if the database cannot be opened.
pub async fn open_sqlite(config: &DatabaseConfig) -> Result<OpenedCatalog<SqliteCatalogStore>> {
    config.validate()?;
    let store = SqliteCatalogStore::connect(&config.url, config.max_connections).await?;
    open(store, Arc::new(SeedCatalog::demo()), config.seed_on_create).await
}
