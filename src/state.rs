use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

use crate::auth::repo::{AccountRepo, PgAccountRepo};
use crate::auth::tokens::AdminTokenKeys;
use crate::config::AppConfig;
use crate::products::repo::{ListingRepo, PgListingRepo};
use crate::storage::{self, StorageClient};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub accounts: Arc<dyn AccountRepo>,
    pub listings: Arc<dyn ListingRepo>,
    pub storage: Arc<dyn StorageClient>,
    pub tokens: AdminTokenKeys,
}

impl AppState {
    /// Connects to Postgres and the configured content store. Returns the pool
    /// as well so the caller can run migrations against it.
    pub async fn init(config: AppConfig) -> anyhow::Result<(Self, PgPool)> {
        let config = Arc::new(config);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let storage = storage::from_config(&config.storage).await?;

        let state = Self::from_parts(
            config,
            Arc::new(PgAccountRepo::new(db.clone())),
            Arc::new(PgListingRepo::new(db.clone())),
            storage,
        );
        Ok((state, db))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        accounts: Arc<dyn AccountRepo>,
        listings: Arc<dyn ListingRepo>,
        storage: Arc<dyn StorageClient>,
    ) -> Self {
        let tokens = AdminTokenKeys::new(&config.admin_token);
        Self {
            config,
            accounts,
            listings,
            storage,
            tokens,
        }
    }
}
