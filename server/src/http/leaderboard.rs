// src/http/leaderboard.rs

use std::collections::HashMap;

use actix_web::{get, web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{entry_repo, game_repo, player_repo};
use crate::error::ApiResult;
use crate::league::leaderboard::{self, EntryLine, GameSheet, PlayerRef};

#[get("/leaderboard")]
pub async fn get_leaderboard(db: web::Data<PgPool>) -> ApiResult<HttpResponse> {
    // 1) Load everything the aggregation needs
    let players = player_repo::list(&db).await?;
    let games = game_repo::list(&db).await?;
    let entries = entry_repo::list_all(&db).await?;

    // 2) Resolve entries onto their games
    let mut by_game: HashMap<Uuid, Vec<EntryLine>> = HashMap::new();
    for e in entries {
        by_game.entry(e.game_id).or_default().push(EntryLine {
            player_id: e.player_id,
            bought_chips: e.bought_chips,
            left_chips: e.left_chips,
        });
    }
    let sheets: Vec<GameSheet> = games
        .into_iter()
        .map(|g| GameSheet {
            id: g.id,
            date: g.date,
            entries: by_game.remove(&g.id).unwrap_or_default(),
        })
        .collect();
    let roster: Vec<PlayerRef> = players
        .into_iter()
        .map(|p| PlayerRef {
            id: p.id,
            name: p.name,
        })
        .collect();

    // 3) Aggregate and rank
    Ok(HttpResponse::Ok().json(leaderboard::build(&roster, &sheets)))
}

/// Mounts the leaderboard route under `/api`
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_leaderboard);
}
