//! Postgres persistence: row models and per-table repositories.

pub mod entry_repo;
pub mod game_repo;
pub mod models;
pub mod player_repo;
pub mod subscriber_repo;

use anyhow::Context;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Settings;

/// Open the pool and bring the schema up to date. Called once at start-up;
/// the caller owns the handle and closes it on shutdown.
pub async fn connect(settings: &Settings) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await
        .context("creating Postgres pool")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("running migrations")?;

    Ok(pool)
}
