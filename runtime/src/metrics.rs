//! Prometheus metrics for seeding.
//!
//! Metrics are recorded through the `metrics` facade and are no-ops until a
//! recorder is installed. The `storefront` binary installs a Prometheus
//! recorder with [`MetricsRecorder::install`]; libraries and tests do not
//! need to.
//!
//! # Example
//!
//! ```rust,no_run
//! use storefront_runtime::metrics::MetricsRecorder;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut recorder = MetricsRecorder::new();
//! recorder.install()?;
//! // ... run the seed loader ...
//! if let Some(text) = recorder.render() {
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```

use crate::seed_loader::CategoryReport;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::Once;
use std::time::Duration;
use thiserror::Error;

/// Store writes made by the seed loader, labelled by `category`.
///
/// A product and its variants count as one write.
pub const SEED_WRITES: &str = "storefront_seed_writes_total";
/// Seed categories that did not finish, labelled by `category`.
pub const SEED_CATEGORY_FAILURES: &str = "storefront_seed_category_failures_total";
/// Wall-clock time of a complete seed run.
pub const SEED_DURATION: &str = "storefront_seed_duration_seconds";

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Process-wide Prometheus recorder.
#[derive(Default)]
pub struct MetricsRecorder {
    handle: Option<PrometheusHandle>,
}

impl MetricsRecorder {
    /// Create a recorder that is not installed yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Describe the seed metrics and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Install`] if another recorder is already
    /// installed in this process.
    pub fn install(&mut self) -> Result<(), MetricsError> {
        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        let handle = builder
            .install_recorder()
            .map_err(|e| MetricsError::Install(e.to_string()))?;
        register_metrics();
        self.handle = Some(handle);
        Ok(())
    }

    /// Render current metrics in Prometheus text format.
    ///
    /// Returns `None` if the recorder hasn't been installed.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register descriptions for every seed metric.
///
/// Safe to call repeatedly; descriptions are only sent once.
pub fn register_metrics() {
    static REGISTER: Once = Once::new();
    REGISTER.call_once(|| {
        describe_counter!(
            SEED_WRITES,
            "Store writes made by the seed loader; a product and its variants count as one"
        );
        describe_counter!(
            SEED_CATEGORY_FAILURES,
            "Seed categories that failed, panicked or were cancelled"
        );
        describe_histogram!(SEED_DURATION, "Time taken by a complete seed run");
    });
}

/// Seed loader metrics recorder.
pub struct SeedMetrics;

impl SeedMetrics {
    /// Record the outcome of one category.
    pub fn record_category(report: &CategoryReport) {
        let category = report.category.as_str();
        let writes = u64::try_from(report.inserted).unwrap_or(u64::MAX);
        counter!(SEED_WRITES, "category" => category).increment(writes);
        if report.error.is_some() {
            counter!(SEED_CATEGORY_FAILURES, "category" => category).increment(1);
        }
    }

    /// Record a complete seed run.
    pub fn record_run(duration: Duration) {
        histogram!(SEED_DURATION).record(duration.as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SeedError;
    use crate::seed_loader::SeedCategory;

    fn render_with(record: impl FnOnce()) -> String {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, record);
        handle.render()
    }

    #[test]
    fn test_category_writes_and_failures_are_counted() {
        let products = CategoryReport {
            category: SeedCategory::Products,
            expected: 5,
            inserted: 5,
            error: None,
        };
        let manufacturers = CategoryReport {
            category: SeedCategory::Manufacturers,
            expected: 4,
            inserted: 2,
            error: Some(SeedError::Cancelled {
                category: SeedCategory::Manufacturers,
            }),
        };

        let text = render_with(|| {
            SeedMetrics::record_category(&products);
            SeedMetrics::record_category(&manufacturers);
        });

        assert!(text.contains(r#"storefront_seed_writes_total{category="products"} 5"#));
        assert!(text.contains(r#"storefront_seed_writes_total{category="manufacturers"} 2"#));
        assert!(
            text.contains(r#"storefront_seed_category_failures_total{category="manufacturers"} 1"#)
        );
        assert!(!text.contains(r#"storefront_seed_category_failures_total{category="products"}"#));
    }

    #[test]
    fn test_run_duration_is_recorded() {
        let text = render_with(|| SeedMetrics::record_run(Duration::from_millis(20)));
        assert!(text.contains("storefront_seed_duration_seconds"));
    }

    #[test]
    fn test_render_before_install_is_none() {
        assert!(MetricsRecorder::new().render().is_none());
    }
}
