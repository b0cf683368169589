use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Game life-cycle. OPEN → CLOSED happens once; there is no reopen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "game_status", rename_all = "UPPERCASE")]
pub enum GameStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: Uuid,
    pub title: String,
    pub date: Option<NaiveDate>,
    pub status: GameStatus,
    pub bank_cost: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEntry {
    pub game_id: Uuid,
    pub player_id: Uuid,
    pub bought_chips: i64,
    pub left_chips: i64,
    pub updated_at: DateTime<Utc>,
}

impl GameEntry {
    /// Chip delta for this entry (`left - bought`).
    pub fn points(&self) -> i64 {
        self.left_chips.saturating_sub(self.bought_chips)
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: Uuid,
    pub email: String,
    pub verified: bool,
    pub unsubscribe_token: String,
    pub created_at: DateTime<Utc>,
}
