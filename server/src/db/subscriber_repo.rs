use anyhow::{Context, Result};
use rand::RngCore;
use sqlx::PgPool;

use crate::db::models::Subscriber;

const SUBSCRIBER_COLUMNS: &str = "id, email, verified, unsubscribe_token, created_at";

/// 16 random bytes, hex-encoded (32 chars).
pub fn new_unsubscribe_token() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub async fn list(db: &PgPool) -> Result<Vec<Subscriber>> {
    sqlx::query_as::<_, Subscriber>(&format!(
        "SELECT {SUBSCRIBER_COLUMNS} FROM subscribers ORDER BY created_at"
    ))
    .fetch_all(db)
    .await
    .context("listing subscribers")
}

/// Inserts an unverified subscriber with a fresh unsubscribe token.
pub async fn insert(db: &PgPool, email: &str) -> Result<Subscriber> {
    sqlx::query_as::<_, Subscriber>(&format!(
        r#"
        INSERT INTO subscribers (email, unsubscribe_token)
        VALUES ($1, $2)
        RETURNING {SUBSCRIBER_COLUMNS}
        "#
    ))
    .bind(email)
    .bind(new_unsubscribe_token())
    .fetch_one(db)
    .await
    .context("inserting subscriber")
}

/// Deletes the subscriber owning `token`; false when no one matches.
pub async fn delete_by_token(db: &PgPool, token: &str) -> Result<bool> {
    let rows = sqlx::query("DELETE FROM subscribers WHERE unsubscribe_token = $1")
        .bind(token)
        .execute(db)
        .await
        .context("deleting subscriber")?
        .rows_affected();
    Ok(rows > 0)
}
