use std::collections::HashSet;

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::Player;

pub async fn list(db: &PgPool) -> Result<Vec<Player>> {
    sqlx::query_as::<_, Player>(
        "SELECT id, name, avatar, created_at FROM players ORDER BY name, id",
    )
    .fetch_all(db)
    .await
    .context("listing players")
}

pub async fn find(db: &PgPool, id: Uuid) -> Result<Option<Player>> {
    sqlx::query_as::<_, Player>("SELECT id, name, avatar, created_at FROM players WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await
        .context("fetching player")
}

/// Inserts a player; a duplicate name surfaces as a unique violation.
pub async fn insert(db: &PgPool, name: &str, avatar: Option<&str>) -> Result<Player> {
    sqlx::query_as::<_, Player>(
        r#"
        INSERT INTO players (name, avatar)
        VALUES ($1, $2)
        RETURNING id, name, avatar, created_at
        "#,
    )
    .bind(name)
    .bind(avatar)
    .fetch_one(db)
    .await
    .context("inserting player")
}

/// Partial update; `None` keeps the stored value, `Some(None)` clears the
/// avatar.
pub async fn update(
    db: &PgPool,
    id: Uuid,
    name: Option<&str>,
    avatar: Option<Option<&str>>,
) -> Result<Option<Player>> {
    sqlx::query_as::<_, Player>(
        r#"
        UPDATE players
           SET name   = COALESCE($2, name),
               avatar = CASE WHEN $3 THEN $4 ELSE avatar END
         WHERE id = $1
     RETURNING id, name, avatar, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(avatar.is_some())
    .bind(avatar.flatten())
    .fetch_optional(db)
    .await
    .context("updating player")
}

/// Deletes a player. Their entries go with them (`ON DELETE CASCADE`).
pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool> {
    let rows = sqlx::query("DELETE FROM players WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("deleting player")?
        .rows_affected();
    Ok(rows > 0)
}

/// Subset of `ids` that exist in the `players` table.
pub async fn existing_ids(db: &PgPool, ids: &[Uuid]) -> Result<HashSet<Uuid>> {
    let found: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM players WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(db)
        .await
        .context("checking player ids")?;
    Ok(found.into_iter().collect())
}
