//! Leaderboard aggregation.
//!
//! Pure function over players and games that already carry their entries.
//! Never fails: missing chip counts are zero by the time they get here.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

/// Shown in `lastGame` for players without a dated game.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryLine {
    pub player_id: Uuid,
    #[serde(default)]
    pub bought_chips: i64,
    #[serde(default)]
    pub left_chips: i64,
}

impl EntryLine {
    pub fn points(&self) -> i64 {
        self.left_chips.saturating_sub(self.bought_chips)
    }
}

/// A game together with its resolved entries.
#[derive(Debug, Clone, Deserialize)]
pub struct GameSheet {
    pub id: Uuid,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub entries: Vec<EntryLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub rank: usize,
    pub player_id: Uuid,
    pub name: String,
    pub games_played: u32,
    pub total_points: i64,
    pub avg_points: String,
    pub total_profit: i64,
    pub win_rate: String,
    pub highest_score: i64,
    pub most_chips_won: i64,
    #[serde(serialize_with = "serialize_last_game")]
    pub last_game: Option<NaiveDate>,
}

fn serialize_last_game<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
    match date {
        Some(d) => s.collect_str(&d.format("%Y-%m-%d")),
        None => s.serialize_str(NOT_AVAILABLE),
    }
}

/// Running totals for one player.
#[derive(Default)]
struct Tally {
    played: u32,
    won: u32,
    total: i64,
    best: Option<i64>,
    last: Option<NaiveDate>,
}

impl Tally {
    fn add(&mut self, points: i64, date: Option<NaiveDate>) {
        self.played += 1;
        self.total = self.total.saturating_add(points);
        if points > 0 {
            self.won += 1;
        }
        self.best = Some(self.best.map_or(points, |b| b.max(points)));
        if date > self.last {
            self.last = date;
        }
    }
}

/// `total / played` to two decimals, `"0.00"` without games.
pub fn format_avg(total: i64, played: u32) -> String {
    if played == 0 {
        return "0.00".to_string();
    }
    format!("{:.2}", total as f64 / f64::from(played))
}

/// Share of winning games as a percentage with one decimal, `"0%"` without
/// games.
pub fn format_win_rate(won: u32, played: u32) -> String {
    if played == 0 {
        return "0%".to_string();
    }
    format!("{:.1}%", f64::from(won) / f64::from(played) * 100.0)
}

/// One ranked row per player, sorted by total points (descending). Exact
/// ties fall back to name, then id, so the order is deterministic.
///
/// Entries whose player is not in `players` are ignored.
pub fn build(players: &[PlayerRef], games: &[GameSheet]) -> Vec<LeaderboardRow> {
    let mut tallies: HashMap<Uuid, Tally> = players
        .iter()
        .map(|p| (p.id, Tally::default()))
        .collect();

    for game in games {
        for entry in &game.entries {
            if let Some(t) = tallies.get_mut(&entry.player_id) {
                t.add(entry.points(), game.date);
            }
        }
    }

    let mut rows: Vec<LeaderboardRow> = players
        .iter()
        .map(|p| {
            let t = tallies.remove(&p.id).unwrap_or_default();
            let best = t.best.unwrap_or(0);
            LeaderboardRow {
                rank: 0,
                player_id: p.id,
                name: p.name.clone(),
                games_played: t.played,
                total_points: t.total,
                avg_points: format_avg(t.total, t.played),
                total_profit: t.total,
                win_rate: format_win_rate(t.won, t.played),
                highest_score: best,
                most_chips_won: best,
                last_game: t.last,
            }
        })
        .collect();

    rows.sort_by(rank_order);
    for (idx, row) in rows.iter_mut().enumerate() {
        row.rank = idx + 1;
    }
    rows
}

fn rank_order(a: &LeaderboardRow, b: &LeaderboardRow) -> Ordering {
    b.total_points
        .cmp(&a.total_points)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.player_id.cmp(&b.player_id))
}
