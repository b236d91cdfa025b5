//! `storefront`: open the local catalog, seeding it on first run.
//!
//! Configuration comes from `STOREFRONT_*` environment variables (see
//! [`storefront_runtime::config`]); logging honours `RUST_LOG`.

use anyhow::{Context, Result};
use storefront_runtime::DatabaseConfig;
use storefront_runtime::metrics::MetricsRecorder;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// The single local account seeded into every fresh catalog.
const LOCAL_USER_ID: i64 = 1;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = DatabaseConfig::from_env().context("reading configuration")?;
    info!(url = %config.url, "Opening catalog");

    let mut recorder = MetricsRecorder::new();
    if let Err(e) = recorder.install() {
        warn!(error = %e, "Metrics disabled");
    }

    let mut catalog = storefront_runtime::open_sqlite(&config)
        .await
        .context("opening catalog")?;

    if let Some(report) = catalog.wait_for_seed().await.context("seeding catalog")? {
        for failure in report.failures() {
            warn!(
                category = %failure.category,
                written = failure.inserted,
                expected = failure.expected,
                "Seed category incomplete"
            );
        }
    } else if !catalog.was_created() {
        info!("Existing catalog, nothing to seed");
    }

    let view = catalog.view();
    let manufacturers = view.manufacturers().await?;
    let products = view.products().await?;
    let cart = view.cart(LOCAL_USER_ID).await?;
    let orders = view.orders(LOCAL_USER_ID).await?;
    info!(
        manufacturers = manufacturers.len(),
        products = products.len(),
        cart_items = cart.len(),
        orders = orders.len(),
        "Catalog ready"
    );

    if let Some(text) = recorder.render() {
        println!("{text}");
    }

    catalog.store().close().await;
    Ok(())
}
