//! Bulk upsert of per-game entries.
//!
//! A request carries an ordered list of `{playerId, boughtChips, leftChips}`
//! records. Records are normalized into [`EntryUpsert`]s (chip counts coerced
//! to non-negative integers, duplicate players collapsed with the later
//! record winning) and written one by one through an [`EntryStore`]. Each
//! write is atomic; the batch is not. Players missing from the input keep
//! whatever entry they already had.

use std::future::Future;

use chrono::Utc;
use dashmap::DashMap;
use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{entry_repo, models::GameEntry};

/// One raw record as posted by the client. Chip fields stay loosely typed so
/// that `"150"`, `150.0`, `null` or a missing key all go through coercion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryInput {
    pub player_id: Uuid,
    #[serde(default)]
    pub bought_chips: Value,
    #[serde(default)]
    pub left_chips: Value,
}

/// Normalized write for a single `(game, player)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryUpsert {
    pub player_id: Uuid,
    pub bought_chips: i64,
    pub left_chips: i64,
}

/// Storage seam for the reconciler.
pub trait EntryStore {
    /// Insert or overwrite the entry keyed on `(game_id, entry.player_id)`.
    fn upsert_entry(
        &self,
        game_id: Uuid,
        entry: EntryUpsert,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;
}

impl EntryStore for PgPool {
    fn upsert_entry(
        &self,
        game_id: Uuid,
        entry: EntryUpsert,
    ) -> impl Future<Output = anyhow::Result<()>> + Send {
        entry_repo::upsert(self, game_id, entry)
    }
}

/// Largest chip count a single entry may hold. Matches the `CHECK` on
/// `game_entries`, and keeps leaderboard sums far from `i64` overflow.
pub const MAX_CHIPS: i64 = i32::MAX as i64;

/// Coerce a loosely typed chip count to an integer in `0..=MAX_CHIPS`.
///
/// Numbers are truncated toward zero and numeric strings are parsed.
/// Negatives clamp to 0, oversized values to [`MAX_CHIPS`], and everything
/// else counts as 0.
pub fn coerce_chips(value: &Value) -> i64 {
    let raw = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    };
    raw.unwrap_or(0).clamp(0, MAX_CHIPS)
}

/// Normalize raw records into upserts.
///
/// A player listed twice keeps the position of its first appearance and the
/// values of its last one.
pub fn plan(records: &[EntryInput]) -> Vec<EntryUpsert> {
    let mut out: Vec<EntryUpsert> = Vec::with_capacity(records.len());
    for record in records {
        let next = EntryUpsert {
            player_id: record.player_id,
            bought_chips: coerce_chips(&record.bought_chips),
            left_chips: coerce_chips(&record.left_chips),
        };
        match out.iter_mut().find(|e| e.player_id == next.player_id) {
            Some(existing) => *existing = next,
            None => out.push(next),
        }
    }
    out
}

/// Apply `records` to `game_id`. Returns how many rows were written.
///
/// Stops at the first store failure; rows already written stay written.
pub async fn reconcile<S: EntryStore>(
    store: &S,
    game_id: Uuid,
    records: &[EntryInput],
) -> anyhow::Result<usize> {
    let upserts = plan(records);
    for entry in &upserts {
        store.upsert_entry(game_id, *entry).await?;
    }
    Ok(upserts.len())
}

/// In-process entry table with the same `(game, player)` key as Postgres.
#[derive(Debug, Default)]
pub struct MemoryEntries {
    rows: DashMap<(Uuid, Uuid), GameEntry>,
}

impl MemoryEntries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries of one game, ordered by player id.
    pub fn entries_for_game(&self, game_id: Uuid) -> Vec<GameEntry> {
        let mut out: Vec<GameEntry> = self
            .rows
            .iter()
            .filter(|r| r.key().0 == game_id)
            .map(|r| r.value().clone())
            .collect();
        out.sort_by_key(|e| e.player_id);
        out
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl EntryStore for MemoryEntries {
    fn upsert_entry(
        &self,
        game_id: Uuid,
        entry: EntryUpsert,
    ) -> impl Future<Output = anyhow::Result<()>> + Send {
        let now = Utc::now();
        self.rows
            .entry((game_id, entry.player_id))
            .and_modify(|row| {
                row.bought_chips = entry.bought_chips;
                row.left_chips = entry.left_chips;
                row.updated_at = now;
            })
            .or_insert_with(|| GameEntry {
                game_id,
                player_id: entry.player_id,
                bought_chips: entry.bought_chips,
                left_chips: entry.left_chips,
                updated_at: now,
            });
        std::future::ready(Ok(()))
    }
}
