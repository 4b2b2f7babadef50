//! Process-wide handles opened before connecting and closed on the way out.

use crate::config::Config;
use crate::db;
use crate::error::Error;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

const USER_AGENT: &str = concat!("andeh-bot/", env!("CARGO_PKG_VERSION"));

/// The HTTP session and database pool. Both are cheap to clone; clones share
/// the same underlying connections.
#[derive(Clone)]
pub struct Resources {
    pub http: reqwest::Client,
    pub db: PgPool,
}

impl Resources {
    /// Open the HTTP session first, then the database pool.
    pub async fn open(config: &Config) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            // Extensions reach user-supplied URLs; a redirect must not lead them elsewhere.
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        let db = db::init_pool(&config.database_url).await?;

        Ok(Self { http, db })
    }

    /// Close the database pool. Waits for checked-out connections to be
    /// returned; every clone of the pool is closed with it.
    pub async fn close(self) {
        self.db.close().await;
        drop(self.http);
        info!("Database pool and HTTP session closed");
    }
}
