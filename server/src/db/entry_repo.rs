use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::GameEntry;
use crate::league::reconcile::EntryUpsert;

const ENTRY_COLUMNS: &str = "game_id, player_id, bought_chips, left_chips, updated_at";

pub async fn list_all(db: &PgPool) -> Result<Vec<GameEntry>> {
    sqlx::query_as::<_, GameEntry>(&format!(
        "SELECT {ENTRY_COLUMNS} FROM game_entries ORDER BY game_id, player_id"
    ))
    .fetch_all(db)
    .await
    .context("listing game entries")
}

pub async fn list_for_game(db: &PgPool, game_id: Uuid) -> Result<Vec<GameEntry>> {
    sqlx::query_as::<_, GameEntry>(&format!(
        "SELECT {ENTRY_COLUMNS} FROM game_entries WHERE game_id = $1 ORDER BY player_id"
    ))
    .bind(game_id)
    .fetch_all(db)
    .await
    .context("listing entries for game")
}

/// Insert or overwrite the `(game, player)` row. Single statement, so each
/// record is atomic on its own.
pub async fn upsert(db: &PgPool, game_id: Uuid, entry: EntryUpsert) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO game_entries (game_id, player_id, bought_chips, left_chips, updated_at)
        VALUES ($1, $2, $3, $4, NOW())
        ON CONFLICT (game_id, player_id)
        DO UPDATE SET bought_chips = EXCLUDED.bought_chips,
                      left_chips   = EXCLUDED.left_chips,
                      updated_at   = EXCLUDED.updated_at
        "#,
    )
    .bind(game_id)
    .bind(entry.player_id)
    .bind(entry.bought_chips)
    .bind(entry.left_chips)
    .execute(db)
    .await
    .with_context(|| format!("upserting entry for player {}", entry.player_id))?;
    Ok(())
}

/// Removes one player's entry from one game.
pub async fn delete(db: &PgPool, game_id: Uuid, player_id: Uuid) -> Result<bool> {
    let rows = sqlx::query("DELETE FROM game_entries WHERE game_id = $1 AND player_id = $2")
        .bind(game_id)
        .bind(player_id)
        .execute(db)
        .await
        .context("deleting game entry")?
        .rows_affected();
    Ok(rows > 0)
}
