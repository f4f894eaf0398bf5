/// Embedded schema migrations
///
/// Migrations live in `recipebook-shared/migrations/` as reversible
/// `{version}_{name}.up.sql` / `.down.sql` pairs and are compiled into the
/// binary with `sqlx::migrate!`.

use sqlx::{
    migrate::{MigrateDatabase, MigrateError, Migrator},
    postgres::PgPool,
    Postgres,
};
use tracing::{debug, info, warn};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Applies every pending migration
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    info!(available = MIGRATOR.iter().count(), "Running database migrations");

    MIGRATOR.run(pool).await.map_err(|e| {
        warn!(error = %e, "Migration failed");
        e
    })?;

    info!("Database schema is up to date");
    Ok(())
}

/// Latest successfully applied migration version, if any
pub async fn schema_version(pool: &PgPool) -> Result<Option<i64>, sqlx::Error> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = 'public' AND table_name = '_sqlx_migrations'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        debug!("No migrations applied yet");
        return Ok(None);
    }

    let version: Option<i64> =
        sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations WHERE success = true")
            .fetch_one(pool)
            .await?;

    Ok(version)
}

/// Newest migration version compiled into this binary
pub fn latest_known_version() -> Option<i64> {
    MIGRATOR.iter().map(|migration| migration.version).max()
}

/// Creates the database when it does not exist yet (development and tests)
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_embedded() {
        assert_eq!(latest_known_version(), Some(20241019000004));
    }

    #[test]
    fn test_every_migration_is_reversible() {
        let ups = MIGRATOR
            .iter()
            .filter(|m| m.migration_type.is_up_migration())
            .count();
        let downs = MIGRATOR
            .iter()
            .filter(|m| m.migration_type.is_down_migration())
            .count();

        assert_eq!(ups, 4);
        assert_eq!(ups, downs);
    }
}
