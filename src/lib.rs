// Library exports for the account-linking core

pub mod app;
pub mod app_config;
pub mod db;
pub mod handlers;
pub mod migrations;
pub mod models;
pub mod schema;
pub mod services;
pub mod utils;

pub use app::AppState;
pub use app_config::{AppConfig, ConfigError};
pub use db::{DieselPool, InMemoryStore, PgStore};
pub use handlers::router;
pub use utils::{ServiceError, WriteStage};

use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use services::{HttpPlanningClient, PlaidClient};

/// Pool, migrations and capability clients, built once from configuration
pub async fn initialize_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    info!(
        "Initializing database pool for {}",
        db::mask_connection_string(&config.database.url)
    );
    let diesel_pool = db::create_diesel_pool(config.diesel_database_config()).await?;

    migrations::run_all_migrations(
        &config.database.url,
        config.database.disable_embedded_migrations,
    )
    .await
    .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    let aggregator = PlaidClient::new(config.plaid_config()).context("building Plaid client")?;
    let planner =
        HttpPlanningClient::new(config.planning_config()).context("building planning client")?;
    let store = PgStore::new(diesel_pool.clone());

    info!(
        "Plaid environment {:?}, planning service at {}",
        config.plaid.environment, config.planning.url
    );

    Ok(AppState::new(
        Arc::new(aggregator),
        Arc::new(store),
        Arc::new(planner),
        config.plaid.products.clone(),
        config.plaid.transactions_lookback_months,
        Some(diesel_pool),
    ))
}
