use std::time::Duration;

use configs::DatabaseConfig;
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::{info, warn};

/// Translate pool settings from config into SeaORM connect options.
pub fn connect_options(cfg: &DatabaseConfig) -> ConnectOptions {
    let mut opt = ConnectOptions::new(cfg.url.clone());
    opt.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
        .sqlx_logging(cfg.sqlx_logging);
    // every pooled connection to `:memory:` would open its own empty database
    if cfg.is_sqlite_memory() {
        opt.max_connections(1).min_connections(1);
    }
    opt
}

pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let db = Database::connect(connect_options(cfg)).await?;
    info!(
        event = "db_connected",
        backend = ?db.get_database_backend(),
        max_connections = cfg.max_connections,
        "database pool ready"
    );
    Ok(db)
}

/// Connect with default pool settings.
pub async fn connect_url(url: &str) -> anyhow::Result<DatabaseConnection> {
    let cfg = DatabaseConfig { url: url.to_string(), ..DatabaseConfig::default() };
    connect(&cfg).await
}

/// Schema auto-sync: apply every pending migration.
///
/// Intended for development only; the schema is changed without any review step.
pub async fn synchronize(db: &DatabaseConnection) -> Result<(), DbErr> {
    warn!(event = "schema_sync", "applying pending migrations at boot; unsafe for production");
    migration::Migrator::up(db, None).await?;
    info!(event = "schema_sync_done", "schema is up to date");
    Ok(())
}
