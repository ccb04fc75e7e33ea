//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! tk-cli migrate
//! tk-cli migrate --dir /srv/takviye/migrations
//! ```
//!
//! Migration files live in `crates/storefront/migrations/` and are read at
//! run time, so a release can ship them next to the binary.

use std::path::Path;

use sqlx::migrate::Migrator;
use thiserror::Error;

/// Migration directory relative to the workspace root.
pub const DEFAULT_DIR: &str = "crates/storefront/migrations";

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Migration directory not found: {0}")]
    MissingDir(String),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply every pending migration in `dir`.
///
/// # Errors
///
/// Returns an error if the directory is missing, the database is unreachable
/// or a migration fails.
pub async fn run(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !dir.is_dir() {
        return Err(MigrationError::MissingDir(dir.display().to_string()).into());
    }

    let migrator = Migrator::new(dir.to_path_buf()).await.map_err(MigrationError::from)?;
    tracing::info!(
        dir = %dir.display(),
        migrations = migrator.iter().count(),
        "Loaded migrations"
    );

    let pool = super::connect().await?;
    tracing::info!("Running migrations...");
    migrator.run(&pool).await.map_err(MigrationError::from)?;
    tracing::info!("Migrations complete!");
    Ok(())
}
