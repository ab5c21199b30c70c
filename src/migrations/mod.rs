// Embedded schema migrations, run once at bootstrap

pub mod diesel;

use std::error::Error;
use tracing::{error, info};

/// Run pending Diesel migrations unless `disabled`
pub async fn run_all_migrations(
    database_url: &str,
    disabled: bool,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if disabled {
        info!("[MIGRATIONS] Skipping embedded migrations (disabled in config)");
        return Ok(());
    }

    let status = diesel::check_migration_status(database_url.to_string()).await?;
    if status.is_up_to_date() {
        info!("[MIGRATIONS] ✓ Diesel migrations up to date");
        return Ok(());
    }

    match diesel::run_migrations(database_url.to_string()).await {
        Ok(applied) => {
            info!("[MIGRATIONS] ✓ Applied {} Diesel migrations", applied);
            Ok(())
        },
        Err(e) => {
            error!("[MIGRATIONS] ✗ Diesel migration failed: {}", e);
            Err(format!("Diesel migration failed: {}", e).into())
        },
    }
}
