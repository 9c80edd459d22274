use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::warn;

use crate::analysis::client::{AnalysisClient, ClaudeClient, MockClient};
use crate::analysis::service::AnalysisService;
use crate::config::AppConfig;
use crate::nutrition::store::MealStore;
use crate::profile::store::ProfileStore;

/// Everything the handlers need, built once at startup and passed by
/// reference through the router state. No ambient singletons.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub meals: MealStore,
    pub profile: ProfileStore,
    pub analysis: AnalysisService,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let options = SqliteConnectOptions::from_str(&config.database_url)
            .context("parse DATABASE_URL")?
            .create_if_missing(true);
        let db = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("open database")?;

        Ok(Self::from_parts(db, config))
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>) -> Self {
        let client: Arc<dyn AnalysisClient> = match config.analysis.api_key.clone() {
            Some(key) => Arc::new(ClaudeClient::new(&config.analysis, key)),
            None => {
                warn!("CLAUDE_API_KEY not set, using the simulated analysis client");
                Arc::new(MockClient)
            }
        };

        Self {
            meals: MealStore::new(db.clone()),
            profile: ProfileStore::new(db.clone()),
            analysis: AnalysisService::new(client),
            db,
            config,
        }
    }
}
