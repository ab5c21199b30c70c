use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use account_link_core::services::aggregator::PlaidEnvironment;
use account_link_core::{app_config, initialize_app_state, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_link_core=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match app_config::AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        },
    };

    info!(
        "Starting account-link-core ({}) on {}",
        config.server.environment, config.server.bind_address
    );

    if config.is_production() && config.plaid.environment == PlaidEnvironment::Sandbox {
        warn!("Production environment is pointed at the Plaid sandbox");
    }

    let state = initialize_app_state(&config).await?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("binding {}", config.server.bind_address))?;

    info!("Listening on {}", config.server.bind_address);
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
