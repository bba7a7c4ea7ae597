//! SQLite connection pool factory and schema bootstrap.
//!
//! Modules contribute idempotent schema statements through
//! [`Module::migrations`](bookshelf_kernel::Module::migrations);
//! [`Database::apply_migrations`] runs all of them at startup.

pub mod error;

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use bookshelf_kernel::settings::DatabaseSettings;
use bookshelf_kernel::ModuleRegistry;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

pub use error::{Result, StorageError};

/// Shared handle to the application's connection pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Wraps an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool according to the database settings.
    ///
    /// In-memory URLs get exactly one connection that is never recycled,
    /// since every SQLite memory connection is a separate database.
    /// File databases run in WAL mode so readers never block the writer.
    pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Self> {
        let in_memory = is_in_memory(&settings.url);

        let mut options = SqliteConnectOptions::from_str(&settings.url)
            .with_context(|| format!("invalid database url '{}'", settings.url))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_millis(settings.busy_timeout_ms));
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(settings.max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("failed to connect to '{}'", settings.url))?;

        tracing::info!(
            target: "bookshelf-db",
            url = %settings.url,
            "database pool ready"
        );

        Ok(Self::new(pool))
    }

    /// Runs every migration contributed by the registered modules.
    pub async fn apply_migrations(&self, registry: &ModuleRegistry) -> anyhow::Result<()> {
        for (module, migration) in registry.collect_migrations() {
            tracing::info!(
                target: "bookshelf-db",
                module = %module,
                migration = migration.id,
                "applying migration"
            );

            sqlx::raw_sql(migration.up)
                .execute(&self.pool)
                .await
                .with_context(|| {
                    format!("migration '{}' of module '{}' failed", migration.id, module)
                })?;
        }

        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
