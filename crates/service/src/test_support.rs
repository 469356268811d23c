#![cfg(test)]
use migration::MigratorTrait;

use crate::database::DatabaseService;

/// Fresh, fully migrated in-memory database; nothing is shared between tests.
pub async fn get_db() -> Result<DatabaseService, anyhow::Error> {
    let db = models::db::connect_url("sqlite::memory:").await?;
    migration::Migrator::up(&db, None).await?;
    Ok(DatabaseService::new(db))
}
