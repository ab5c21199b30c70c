// Diesel migration runner for PostgreSQL
// MigrationHarness is sync, so each call runs on a blocking thread with its own PgConnection

use diesel::Connection;
use diesel::PgConnection;
use diesel_migrations::MigrationHarness;
use std::error::Error;
use tracing::{debug, info};

use crate::db::diesel_pool::MIGRATIONS;

type MigrationResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

fn establish(database_url: &str) -> MigrationResult<PgConnection> {
    PgConnection::establish(database_url)
        .map_err(|e| format!("Failed to establish sync connection: {}", e).into())
}

/// Apply pending migrations; returns how many ran
pub async fn run_migrations(database_url: String) -> MigrationResult<usize> {
    tokio::task::spawn_blocking(move || -> MigrationResult<usize> {
        let mut conn = establish(&database_url)?;

        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| format!("Failed to run migrations: {}", e))?;

        for migration in &applied {
            debug!("[DIESEL] Applied migration: {}", migration);
        }
        Ok(applied.len())
    })
    .await
    .map_err(|e| format!("Migration task panicked: {}", e))?
}

#[derive(Debug)]
pub struct MigrationStatus {
    pub applied_count: usize,
    pub pending_migrations: Vec<String>,
}

impl MigrationStatus {
    pub fn is_up_to_date(&self) -> bool {
        self.pending_migrations.is_empty()
    }
}

pub async fn check_migration_status(database_url: String) -> MigrationResult<MigrationStatus> {
    let status = tokio::task::spawn_blocking(move || -> MigrationResult<MigrationStatus> {
        let mut conn = establish(&database_url)?;

        let applied = conn
            .applied_migrations()
            .map_err(|e| format!("Failed to get applied migrations: {}", e))?;
        let pending = conn
            .pending_migrations(MIGRATIONS)
            .map_err(|e| format!("Failed to get pending migrations: {}", e))?;

        Ok(MigrationStatus {
            applied_count: applied.len(),
            pending_migrations: pending.iter().map(|m| m.name().to_string()).collect(),
        })
    })
    .await
    .map_err(|e| format!("Status check task panicked: {}", e))??;

    info!(
        "[DIESEL] {} applied, {} pending",
        status.applied_count,
        status.pending_migrations.len()
    );
    Ok(status)
}
