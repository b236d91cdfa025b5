//! Concurrent loading of the seed catalog into a fresh store.
//!
//! # Structure
//!
//! Each [`SeedCategory`] is inserted by its own task. Tasks are grouped into
//! two waves so that every child row is written after the rows it points at:
//!
//! ```text
//! wave 1:  User   Manufacturers   Advertisements   PaymentProviders   Location
//!                      │                                 │
//! wave 2:           Products                  UserPaymentProviders
//! ```
//!
//! Tasks of a wave run concurrently on a `JoinSet`; a wave starts once every
//! task of the previous wave has completed, and [`SeedLoader::run`] returns
//! once the last wave is done.
//!
//! # Failure isolation
//!
//! Inside a task, inserts are sequential and the first failure skips the rest
//! of that category. Other categories are unaffected. Nothing is retried. A
//! panicking task is caught and reported as [`SeedError::Panicked`].
//!
//! # Cancellation
//!
//! [`SeedHandle::cancel`] (or [`SeedLoader::cancel`]) stops a run between
//! writes: every unfinished category reports [`SeedError::Cancelled`] with
//! the writes it completed, and categories that had not started report zero.
//! A write already in flight is not interrupted.
//!
//! Each product is written together with its colour and size variants in a
//! single atomic store call, so a product is never visible without them.

use crate::error::{RuntimeError, SeedError};
use crate::metrics::SeedMetrics;
use futures::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use storefront_core::catalog_store::{CatalogStore, StoreError};
use storefront_core::seed::SeedCatalog;
use tokio::task::{JoinHandle, JoinSet};

/// A group of seed rows inserted by one task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SeedCategory {
    /// The local user
    User,
    /// Manufacturers
    Manufacturers,
    /// Advertisement banners
    Advertisements,
    /// Payment providers
    PaymentProviders,
    /// The user's location
    Location,
    /// Products with their colour and size variants
    Products,
    /// Cards registered with payment providers
    UserPaymentProviders,
}

impl SeedCategory {
    /// Every category, in report order.
    pub const ALL: [Self; 7] = [
        Self::User,
        Self::Manufacturers,
        Self::Advertisements,
        Self::PaymentProviders,
        Self::Location,
        Self::Products,
        Self::UserPaymentProviders,
    ];

    /// Stable name used in logs and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Manufacturers => "manufacturers",
            Self::Advertisements => "advertisements",
            Self::PaymentProviders => "payment_providers",
            Self::Location => "location",
            Self::Products => "products",
            Self::UserPaymentProviders => "user_payment_providers",
        }
    }

    /// The wave this category runs in.
    ///
    /// Categories whose rows reference another category's rows run in wave 2.
    #[must_use]
    pub const fn wave(self) -> u8 {
        match self {
            Self::Products | Self::UserPaymentProviders => 2,
            _ => 1,
        }
    }

    /// Number of store writes this category performs for `catalog`.
    ///
    /// A product and its variants count as one write.
    #[must_use]
    pub fn expected_writes(self, catalog: &SeedCatalog) -> usize {
        match self {
            Self::User | Self::Location => 1,
            Self::Manufacturers => catalog.manufacturers().len(),
            Self::Advertisements => catalog.advertisements().len(),
            Self::PaymentProviders => catalog.payment_providers().len(),
            Self::Products => catalog.products().len(),
            Self::UserPaymentProviders => catalog.user_payment_providers().len(),
        }
    }
}

impl fmt::Display for SeedCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryReport {
    /// The category
    pub category: SeedCategory,
    /// Writes the catalog called for
    pub expected: usize,
    /// Writes that succeeded
    pub inserted: usize,
    /// Why the category stopped early, if it did
    pub error: Option<SeedError>,
}

impl CategoryReport {
    /// Whether every write of the category succeeded.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.error.is_none() && self.inserted == self.expected
    }
}

/// Outcome of a complete seed run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    categories: Vec<CategoryReport>,
    elapsed: Duration,
}

impl SeedReport {
    /// Per-category outcomes, in [`SeedCategory::ALL`] order.
    #[must_use]
    pub fn categories(&self) -> &[CategoryReport] {
        &self.categories
    }

    /// Outcome of one category.
    #[must_use]
    pub fn category(&self, category: SeedCategory) -> Option<&CategoryReport> {
        self.categories.iter().find(|r| r.category == category)
    }

    /// Categories that did not finish.
    pub fn failures(&self) -> impl Iterator<Item = &CategoryReport> {
        self.categories.iter().filter(|r| r.error.is_some())
    }

    /// Whether every category finished.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.categories.iter().all(CategoryReport::is_complete)
    }

    /// Total successful writes across categories.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.categories.iter().map(|r| r.inserted).sum()
    }

    /// Wall-clock time of the run.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Loads a [`SeedCatalog`] into a store.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use storefront_core::SeedCatalog;
/// use storefront_runtime::SeedLoader;
/// use storefront_testing::InMemoryCatalogStore;
///
/// # tokio_test::block_on(async {
/// let store = Arc::new(InMemoryCatalogStore::new());
/// let loader = SeedLoader::new(Arc::clone(&store), Arc::new(SeedCatalog::demo()));
///
/// let report = loader.run().await;
/// assert!(report.is_complete());
/// assert_eq!(store.product_count(), 5);
/// # });
/// ```
///
/// Clones share the cancellation flag.
#[derive(Debug)]
pub struct SeedLoader<S> {
    store: Arc<S>,
    catalog: Arc<SeedCatalog>,
    cancelled: Arc<AtomicBool>,
}

impl<S> Clone for SeedLoader<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            catalog: Arc::clone(&self.catalog),
            cancelled: Arc::clone(&self.cancelled),
        }
    }
}

impl<S: CatalogStore + 'static> SeedLoader<S> {
    /// Create a loader writing `catalog` into `store`.
    #[must_use]
    pub fn new(store: Arc<S>, catalog: Arc<SeedCatalog>) -> Self {
        Self {
            store,
            catalog,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stop the run before its next write.
    ///
    /// Cancelling before [`run`](Self::run) starts makes every category
    /// report [`SeedError::Cancelled`] without writing anything.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Insert every category and wait for all of them.
    ///
    /// Never fails as a whole: per-category failures are logged, counted and
    /// returned in the report.
    #[tracing::instrument(skip(self), name = "seed_catalog")]
    pub async fn run(&self) -> SeedReport {
        let started = Instant::now();
        let mut categories = Vec::with_capacity(SeedCategory::ALL.len());

        for wave in 1..=2 {
            let wave_categories: Vec<_> = SeedCategory::ALL
                .into_iter()
                .filter(|c| c.wave() == wave)
                .collect();
            tracing::debug!(wave, categories = wave_categories.len(), "Starting seed wave");

            let mut tasks = JoinSet::new();
            for category in wave_categories {
                let store = Arc::clone(&self.store);
                let catalog = Arc::clone(&self.catalog);
                let cancelled = Arc::clone(&self.cancelled);
                tasks.spawn(seed_category(store, catalog, cancelled, category));
            }

            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(report) => categories.push(report),
                    Err(e) => tracing::error!(error = %e, "Seed task could not be joined"),
                }
            }
        }

        categories.sort_by_key(|r| r.category);
        for report in &categories {
            SeedMetrics::record_category(report);
        }

        let elapsed = started.elapsed();
        SeedMetrics::record_run(elapsed);

        let report = SeedReport {
            categories,
            elapsed,
        };
        tracing::info!(
            writes = report.writes(),
            failures = report.failures().count(),
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "Seed catalog loaded"
        );
        report
    }

    /// Run the loader in the background.
    ///
    /// Dropping the returned handle detaches the task: seeding still
    /// completes, nobody observes it. Call [`SeedHandle::wait`] to join.
    #[must_use = "dropping the handle detaches seeding; call wait() to observe completion"]
    pub fn spawn(self) -> SeedHandle {
        let cancelled = Arc::clone(&self.cancelled);
        SeedHandle {
            task: tokio::spawn(async move { self.run().await }),
            cancelled,
        }
    }
}

/// Handle to a seed run started with [`SeedLoader::spawn`].
#[derive(Debug)]
pub struct SeedHandle {
    task: JoinHandle<SeedReport>,
    cancelled: Arc<AtomicBool>,
}

impl SeedHandle {
    /// Ask the run to stop before its next write.
    ///
    /// [`wait`](Self::wait) still returns a report; unfinished categories
    /// carry [`SeedError::Cancelled`].
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether the run has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the run to complete.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::SeedTask`] if the background task was
    /// cancelled or panicked outside of any category.
    pub async fn wait(self) -> Result<SeedReport, RuntimeError> {
        self.task
            .await
            .map_err(|e| RuntimeError::SeedTask(e.to_string()))
    }
}

/// Run one category and turn its outcome into a report.
async fn seed_category<S: CatalogStore>(
    store: Arc<S>,
    catalog: Arc<SeedCatalog>,
    cancelled: Arc<AtomicBool>,
    category: SeedCategory,
) -> CategoryReport {
    let progress = Progress {
        category,
        inserted: AtomicUsize::new(0),
        cancelled: &cancelled,
    };
    let outcome = AssertUnwindSafe(insert_category(&*store, &catalog, &progress))
        .catch_unwind()
        .await;

    let error = match outcome {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(e),
        Err(_) => Some(SeedError::Panicked { category }),
    };
    let report = CategoryReport {
        category,
        expected: category.expected_writes(&catalog),
        inserted: progress.inserted.into_inner(),
        error,
    };

    match &report.error {
        None => tracing::debug!(%category, writes = report.inserted, "Seed category done"),
        Some(SeedError::Cancelled { .. }) => tracing::warn!(
            %category,
            writes = report.inserted,
            expected = report.expected,
            "Seed category cancelled"
        ),
        Some(e) => tracing::error!(
            %category,
            writes = report.inserted,
            expected = report.expected,
            error = %e,
            "Seed category failed"
        ),
    }
    report
}

/// Write counter and cancellation check for one category.
struct Progress<'a> {
    category: SeedCategory,
    inserted: AtomicUsize,
    cancelled: &'a AtomicBool,
}

impl Progress<'_> {
    fn check_cancelled(&self) -> Result<(), SeedError> {
        if self.cancelled.load(Ordering::Acquire) {
            return Err(SeedError::Cancelled {
                category: self.category,
            });
        }
        Ok(())
    }

    fn record(&self, result: Result<(), StoreError>) -> Result<(), SeedError> {
        result.map_err(|source| SeedError::Store {
            category: self.category,
            source,
        })?;
        self.inserted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Issue the category's writes in order, stopping at the first failure or
/// at cancellation.
async fn insert_category<S: CatalogStore>(
    store: &S,
    catalog: &SeedCatalog,
    progress: &Progress<'_>,
) -> Result<(), SeedError> {
    match progress.category {
        SeedCategory::User => {
            progress.check_cancelled()?;
            progress.record(store.save_user(catalog.user()).await)?;
        }
        SeedCategory::Manufacturers => {
            for manufacturer in catalog.manufacturers() {
                progress.check_cancelled()?;
                progress.record(store.insert_manufacturer(manufacturer).await)?;
            }
        }
        SeedCategory::Advertisements => {
            for advertisement in catalog.advertisements() {
                progress.check_cancelled()?;
                progress.record(store.insert_advertisement(advertisement).await)?;
            }
        }
        SeedCategory::PaymentProviders => {
            for provider in catalog.payment_providers() {
                progress.check_cancelled()?;
                progress.record(store.save_payment_provider(provider).await)?;
            }
        }
        SeedCategory::Location => {
            progress.check_cancelled()?;
            progress.record(store.save_location(catalog.location()).await)?;
        }
        SeedCategory::Products => {
            for seed in catalog.products() {
                progress.check_cancelled()?;
                progress.record(
                    store
                        .insert_product_with_variants(&seed.product, &seed.colors, &seed.sizes)
                        .await,
                )?;
            }
        }
        SeedCategory::UserPaymentProviders => {
            for link in catalog.user_payment_providers() {
                progress.check_cancelled()?;
                progress.record(store.save_user_payment_provider(link).await)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_run_after_parents() {
        assert!(SeedCategory::Products.wave() > SeedCategory::Manufacturers.wave());
        assert!(SeedCategory::UserPaymentProviders.wave() > SeedCategory::PaymentProviders.wave());
        assert_eq!(SeedCategory::User.wave(), 1);
    }

    #[test]
    fn test_expected_writes_for_demo() {
        let catalog = SeedCatalog::demo();
        let counts: Vec<_> = SeedCategory::ALL
            .iter()
            .map(|c| (c.as_str(), c.expected_writes(&catalog)))
            .collect();
        assert_eq!(
            counts,
            [
                ("user", 1),
                ("manufacturers", 4),
                ("advertisements", 4),
                ("payment_providers", 3),
                ("location", 1),
                ("products", 5),
                ("user_payment_providers", 3),
            ]
        );
    }

    #[test]
    fn test_report_completeness() {
        let done = CategoryReport {
            category: SeedCategory::User,
            expected: 1,
            inserted: 1,
            error: None,
        };
        let failed = CategoryReport {
            category: SeedCategory::Location,
            expected: 1,
            inserted: 0,
            error: Some(SeedError::Panicked {
                category: SeedCategory::Location,
            }),
        };
        let report = SeedReport {
            categories: vec![done.clone(), failed],
            elapsed: Duration::ZERO,
        };

        assert!(done.is_complete());
        assert!(!report.is_complete());
        assert_eq!(report.writes(), 1);
        assert_eq!(report.failures().count(), 1);
        assert!(report.category(SeedCategory::Products).is_none());
    }
}
