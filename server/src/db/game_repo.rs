use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{Game, GameStatus};

const GAME_COLUMNS: &str = "id, title, date, status, bank_cost, created_at, closed_at";

/// Result of trying to close a game.
#[derive(Debug)]
pub enum CloseOutcome {
    Closed(Game),
    AlreadyClosed,
    Missing,
}

/// Every game, newest first (undated games last).
pub async fn list(db: &PgPool) -> Result<Vec<Game>> {
    sqlx::query_as::<_, Game>(&format!(
        "SELECT {GAME_COLUMNS} FROM games ORDER BY date DESC NULLS LAST, created_at DESC"
    ))
    .fetch_all(db)
    .await
    .context("listing games")
}

pub async fn find(db: &PgPool, id: Uuid) -> Result<Option<Game>> {
    sqlx::query_as::<_, Game>(&format!("SELECT {GAME_COLUMNS} FROM games WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("fetching game")
}

pub async fn exists(db: &PgPool, id: Uuid) -> Result<bool> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM games WHERE id = $1)")
        .bind(id)
        .fetch_one(db)
        .await
        .context("checking game existence")
}

/// Inserts a new OPEN game.
pub async fn insert(
    db: &PgPool,
    title: &str,
    date: Option<NaiveDate>,
    bank_cost: Option<f64>,
) -> Result<Game> {
    sqlx::query_as::<_, Game>(&format!(
        r#"
        INSERT INTO games (title, date, bank_cost)
        VALUES ($1, $2, $3)
        RETURNING {GAME_COLUMNS}
        "#
    ))
    .bind(title)
    .bind(date)
    .bind(bank_cost)
    .fetch_one(db)
    .await
    .context("inserting game")
}

/// Partial update of the editable fields. Status is only changed by [`close`].
///
/// `None` keeps the stored value; `Some(None)` clears `date` / `bank_cost`.
pub async fn update(
    db: &PgPool,
    id: Uuid,
    title: Option<&str>,
    date: Option<Option<NaiveDate>>,
    bank_cost: Option<Option<f64>>,
) -> Result<Option<Game>> {
    sqlx::query_as::<_, Game>(&format!(
        r#"
        UPDATE games
           SET title     = COALESCE($2, title),
               date      = CASE WHEN $3 THEN $4 ELSE date END,
               bank_cost = CASE WHEN $5 THEN $6 ELSE bank_cost END
         WHERE id = $1
     RETURNING {GAME_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(title)
    .bind(date.is_some())
    .bind(date.flatten())
    .bind(bank_cost.is_some())
    .bind(bank_cost.flatten())
    .fetch_optional(db)
    .await
    .context("updating game")
}

/// Deletes a game together with its entries (`ON DELETE CASCADE`).
pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool> {
    let rows = sqlx::query("DELETE FROM games WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("deleting game")?
        .rows_affected();
    Ok(rows > 0)
}

/// OPEN → CLOSED, stamping `closed_at`. The status guard makes the
/// transition happen at most once even under concurrent requests.
pub async fn close(db: &PgPool, id: Uuid) -> Result<CloseOutcome> {
    let closed = sqlx::query_as::<_, Game>(&format!(
        r#"
        UPDATE games
           SET status = $2, closed_at = NOW()
         WHERE id = $1 AND status = $3
     RETURNING {GAME_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(GameStatus::Closed)
    .bind(GameStatus::Open)
    .fetch_optional(db)
    .await
    .context("closing game")?;

    if let Some(game) = closed {
        return Ok(CloseOutcome::Closed(game));
    }
    if exists(db, id).await? {
        Ok(CloseOutcome::AlreadyClosed)
    } else {
        Ok(CloseOutcome::Missing)
    }
}
