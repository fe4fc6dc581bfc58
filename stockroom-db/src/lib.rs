//! Database lifecycle management for Stockroom.
//!
//! Provides migration running, status checking, and demo data seeding.

mod seed;

pub use seed::{seed_demo_data, SeedSummary};

use chrono::{DateTime, Utc};
use sqlx::migrate::Migrator;
use sqlx::PgPool;
use tracing::{info, warn};

static MIGRATOR: Migrator = sqlx::migrate!("../migrations");

/// Result type for DB operations.
pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// Run all pending migrations.
///
/// Uses sqlx migrations from the workspace `migrations` directory.
/// Idempotent: safe to run multiple times.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    info!("Running database migrations...");

    MIGRATOR.run(pool).await?;

    info!("Migrations completed successfully");
    Ok(())
}

/// One row of the `_sqlx_migrations` bookkeeping table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AppliedMigration {
    pub version: i64,
    pub description: String,
    pub installed_on: DateTime<Utc>,
    pub success: bool,
}

/// Schema state compared with the migrations compiled into this binary.
#[derive(Debug, Clone, Default)]
pub struct MigrationStatus {
    /// Applied migrations, newest first
    pub applied: Vec<AppliedMigration>,
    /// Known versions with no successful row, oldest first
    pub pending: Vec<i64>,
}

impl MigrationStatus {
    pub fn is_current(&self) -> bool {
        self.pending.is_empty() && self.applied.iter().all(|m| m.success)
    }
}

/// Report which bundled migrations the database has applied.
///
/// A database without the bookkeeping table reports every migration as
/// pending.
pub async fn status(pool: &PgPool) -> Result<MigrationStatus> {
    let tracked: bool =
        sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
            .fetch_one(pool)
            .await?;

    let applied = if tracked {
        sqlx::query_as::<_, AppliedMigration>(
            r#"
            SELECT version, description, installed_on, success
            FROM _sqlx_migrations
            ORDER BY version DESC
            "#,
        )
        .fetch_all(pool)
        .await?
    } else {
        Vec::new()
    };

    let known: Vec<i64> = MIGRATOR.iter().map(|m| m.version).collect();
    let status = MigrationStatus {
        pending: pending_versions(&known, &applied),
        applied,
    };

    for m in &status.applied {
        info!(
            version = m.version,
            description = %m.description,
            installed_on = %m.installed_on,
            success = m.success,
            "Applied migration"
        );
    }
    if status.is_current() {
        info!(applied = status.applied.len(), "Schema is up to date");
    } else {
        warn!(
            pending = ?status.pending,
            "Schema is behind (run `stockroomd db migrate`)"
        );
    }

    Ok(status)
}

fn pending_versions(known: &[i64], applied: &[AppliedMigration]) -> Vec<i64> {
    known
        .iter()
        .copied()
        .filter(|v| !applied.iter().any(|m| m.version == *v && m.success))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applied(version: i64, success: bool) -> AppliedMigration {
        AppliedMigration {
            version,
            description: format!("migration {}", version),
            installed_on: Utc::now(),
            success,
        }
    }

    #[test]
    fn test_unapplied_versions_are_pending() {
        let pending = pending_versions(&[1, 2, 3], &[applied(1, true)]);
        assert_eq!(pending, vec![2, 3]);
    }

    #[test]
    fn test_failed_migration_stays_pending() {
        let rows = vec![applied(2, false), applied(1, true)];
        let status = MigrationStatus {
            pending: pending_versions(&[1, 2], &rows),
            applied: rows,
        };

        assert_eq!(status.pending, vec![2]);
        assert!(!status.is_current());
    }

    #[test]
    fn test_bundled_migrations_are_known() {
        let versions: Vec<i64> = MIGRATOR.iter().map(|m| m.version).collect();
        assert_eq!(versions, vec![20240301000001, 20240301000002]);
    }
}
