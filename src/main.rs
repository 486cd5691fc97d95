//! Storefront Checkout - service entry point
//!
//! ```text
//! ┌──────────┐    ┌──────────────┐    ┌─────────────┐    ┌──────────┐
//! │  Config  │───▶│ Order store  │───▶│ Orchestrator│───▶│ Gateway  │
//! │  (YAML)  │    │ (PG or mem)  │    │  + Moyasar  │    │  (axum)  │
//! └──────────┘    └──────────────┘    └─────────────┘    └──────────┘
//! ```

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use storefront_checkout::checkout::{CheckoutOrchestrator, CheckoutSettings};
use storefront_checkout::config::{AppConfig, CliArgs, SimulationConfig};
use storefront_checkout::db::Database;
use storefront_checkout::gateway::{self, AppState};
use storefront_checkout::logging;
use storefront_checkout::models::Product;
use storefront_checkout::payment::{MoyasarGateway, PaymentGateway};
use storefront_checkout::store::{InMemoryStore, OrderStore, PgCatalog, PgOrderStore, ProductCatalog};

/// In-memory catalog seeded from the `simulation` config section
fn simulation_store(sim: &SimulationConfig) -> InMemoryStore {
    let store = sim
        .stores
        .iter()
        .fold(InMemoryStore::new(), |s, id| s.with_store(id.as_str()));
    sim.products.iter().fold(store, |s, p| {
        s.with_product(Product::new(p.id.as_str(), p.price))
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliArgs::parse();
    let config = AppConfig::from_args(&cli)
        .with_context(|| format!("loading configuration from {}", cli.config_path()))?;
    let _log_guard = logging::init_logging(&config);

    info!(
        env = %cli.env,
        version = env!("GIT_HASH"),
        "Starting storefront checkout"
    );
    info!(payment = ?config.payment, "Payment provider settings");

    config.validate()?;

    let settings = CheckoutSettings::from_config(&config.checkout)?;
    let timeout = settings.timeout;

    let (catalog, orders): (Arc<dyn ProductCatalog>, Arc<dyn OrderStore>) =
        match &config.postgres_url {
            Some(url) => {
                let db = Database::connect(url, timeout)
                    .await
                    .context("connecting to PostgreSQL")?;
                db.health_check().await.context("PostgreSQL health check")?;
                let pool = db.pool().clone();
                (
                    Arc::new(PgCatalog::new(pool.clone())),
                    Arc::new(PgOrderStore::new(pool)),
                )
            }
            None => {
                warn!(
                    stores = config.simulation.stores.len(),
                    products = config.simulation.products.len(),
                    "No postgres_url configured, running in simulation mode"
                );
                let store = Arc::new(simulation_store(&config.simulation));
                (store.clone(), store)
            }
        };

    let moyasar = MoyasarGateway::new(&config.payment, timeout)?;
    info!(provider = moyasar.name(), endpoint = moyasar.endpoint(), "Payment gateway ready");
    let payment: Arc<dyn PaymentGateway> = Arc::new(moyasar);

    let orchestrator = Arc::new(CheckoutOrchestrator::new(catalog, orders, payment, settings));
    let state = Arc::new(AppState::new(orchestrator, &config.server.cors_allow_origin)?);

    gateway::run_server(&config.server, state)
        .await
        .context("checkout gateway")?;

    info!("Storefront checkout stopped");
    Ok(())
}
