//! Bookshelf application library
//!
//! Wires the Books module into the kernel lifecycle, the SQLite pool, and the
//! HTTP server.

pub mod modules;

use std::future::Future;

use anyhow::Context;
use axum::Router;
use bookshelf_db::Database;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// A fully bootstrapped application: schema applied, modules started.
pub struct Application {
    settings: Settings,
    db: Database,
    registry: ModuleRegistry,
}

impl Application {
    /// Connect storage, register modules, apply schema, then init and start modules.
    pub async fn bootstrap(settings: Settings) -> anyhow::Result<Self> {
        let db = Database::connect(&settings.database)
            .await
            .context("failed to open database")?;

        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &db);

        db.apply_migrations(&registry)
            .await
            .context("failed to apply schema")?;

        let ctx = InitCtx {
            settings: &settings,
        };
        registry.init_modules(&ctx).await?;
        registry.start_modules(&ctx).await?;

        Ok(Self {
            settings,
            db,
            registry,
        })
    }

    /// The complete HTTP router, middleware included.
    pub fn router(&self) -> Router {
        bookshelf_http::build_router(&self.registry, &self.settings)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Serve until `shutdown` resolves, then stop modules and close the pool.
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let served = bookshelf_http::start_server(&self.registry, &self.settings, shutdown).await;

        self.registry.stop_modules().await?;
        self.db.close().await;

        served
    }
}
