pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod extensions;
pub mod lifecycle;
pub mod patterns;
pub mod resources;
pub mod shutdown;
pub mod sync;
pub mod utils;

use std::path::PathBuf;
use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::RwLock;

/// Shared data accessible across all Poise commands and event handlers.
pub struct Data {
    pub db: PgPool,
    pub http: reqwest::Client,
    pub config: RwLock<config::Config>,
    /// Env file re-read by `Config::reload`.
    pub env_path: PathBuf,
    pub patterns: patterns::PatternRegistry,
    pub lifecycle: Arc<lifecycle::Lifecycle>,
    pub extensions: extensions::LoadReport,
    pub start_time: std::time::Instant,
}

/// Poise context alias used throughout the bot.
pub type Context<'a> = poise::Context<'a, Data, error::Error>;
