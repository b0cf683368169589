//! Game sessions: CRUD, close, and the per-entry money view.

use std::collections::HashMap;

use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{
    entry_repo, game_repo,
    game_repo::CloseOutcome,
    models::{Game, GameEntry, GameStatus, Player},
    player_repo,
};
use crate::error::{ApiError, ApiResult};
use crate::http::auth::AdminSession;
use crate::league::money;
use crate::metrics::GAMES_CLOSED;

//////////////////////////////////////////////////
// Views
//////////////////////////////////////////////////

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryView {
    pub player_id: Uuid,
    pub player_name: Option<String>,
    pub bought_chips: i64,
    pub left_chips: i64,
    pub chips_diff: i64,
    /// `null` when the game has no bank cost to convert with.
    pub money_balance: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub id: Uuid,
    pub title: String,
    pub date: Option<NaiveDate>,
    pub status: GameStatus,
    pub bank_cost: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub entries: Vec<EntryView>,
}

/// Attach entries (with player names and money balances) to each game.
/// Input order of `games` is kept; entries are ordered by player name.
pub fn build_views(games: Vec<Game>, entries: Vec<GameEntry>, players: &[Player]) -> Vec<GameView> {
    let names: HashMap<Uuid, &str> = players.iter().map(|p| (p.id, p.name.as_str())).collect();
    let mut by_game: HashMap<Uuid, Vec<GameEntry>> = HashMap::new();
    for entry in entries {
        by_game.entry(entry.game_id).or_default().push(entry);
    }

    games
        .into_iter()
        .map(|game| {
            let mut rows: Vec<EntryView> = by_game
                .remove(&game.id)
                .unwrap_or_default()
                .into_iter()
                .map(|e| {
                    let chips_diff = e.points();
                    EntryView {
                        player_id: e.player_id,
                        player_name: names.get(&e.player_id).map(|n| n.to_string()),
                        bought_chips: e.bought_chips,
                        left_chips: e.left_chips,
                        chips_diff,
                        money_balance: money::balance(game.bank_cost, chips_diff),
                    }
                })
                .collect();
            rows.sort_by(|a, b| {
                a.player_name
                    .cmp(&b.player_name)
                    .then_with(|| a.player_id.cmp(&b.player_id))
            });

            GameView {
                id: game.id,
                title: game.title,
                date: game.date,
                status: game.status,
                bank_cost: game.bank_cost,
                created_at: game.created_at,
                closed_at: game.closed_at,
                entries: rows,
            }
        })
        .collect()
}

//////////////////////////////////////////////////
// Requests
//////////////////////////////////////////////////

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (only the date is kept).
pub fn parse_loose_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

fn de_loose_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_loose_date(s)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid date '{s}'"))),
    }
}

/// Present-but-null (or blank) becomes `Some(None)`.
fn de_loose_date_patch<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<Option<NaiveDate>>, D::Error> {
    de_loose_date(d).map(Some)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReq {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "de_loose_date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub bank_cost: Option<f64>,
}

/// Absent keys keep the stored value; `date: null` / `bankCost: null` clear it.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReq {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "de_loose_date_patch")]
    pub date: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub bank_cost: Option<Option<f64>>,
}

fn check_bank_cost(bank_cost: Option<f64>) -> ApiResult<()> {
    match bank_cost {
        Some(c) if !c.is_finite() || c < 0.0 => {
            Err(ApiError::BadRequest("bankCost must be a non-negative number".into()))
        }
        _ => Ok(()),
    }
}

/// Title for a new game: explicit title, else the date, else a placeholder.
fn default_title(title: Option<&str>, date: Option<NaiveDate>) -> String {
    match (title.map(str::trim).filter(|t| !t.is_empty()), date) {
        (Some(t), _) => t.to_string(),
        (None, Some(d)) => d.format("%Y-%m-%d").to_string(),
        (None, None) => "Untitled game".to_string(),
    }
}

//////////////////////////////////////////////////
// Handlers
//////////////////////////////////////////////////

/// GET /api/games
#[get("/games")]
pub async fn list(db: web::Data<PgPool>) -> ApiResult<HttpResponse> {
    let games = game_repo::list(&db).await?;
    let entries = entry_repo::list_all(&db).await?;
    let players = player_repo::list(&db).await?;
    Ok(HttpResponse::Ok().json(build_views(games, entries, &players)))
}

/// GET /api/games/{id}
#[get("/games/{id}")]
pub async fn get_one(path: web::Path<Uuid>, db: web::Data<PgPool>) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    let game = game_repo::find(&db, id)
        .await?
        .ok_or(ApiError::NotFound("Game not found"))?;
    let entries = entry_repo::list_for_game(&db, id).await?;
    let players = player_repo::list(&db).await?;

    let view = build_views(vec![game], entries, &players).pop();
    Ok(HttpResponse::Ok().json(view))
}

/// POST /api/games
#[post("/games")]
pub async fn create(
    _admin: AdminSession,
    info: web::Json<CreateReq>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    check_bank_cost(info.bank_cost)?;
    let title = default_title(info.title.as_deref(), info.date);

    let game = game_repo::insert(&db, &title, info.date, info.bank_cost).await?;
    log::info!("game {} created ({})", game.title, game.id);
    Ok(HttpResponse::Created().json(game))
}

/// PATCH /api/games/{id}
#[patch("/games/{id}")]
pub async fn update(
    _admin: AdminSession,
    path: web::Path<Uuid>,
    info: web::Json<UpdateReq>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    check_bank_cost(info.bank_cost.flatten())?;
    let title = info.title.as_deref().map(str::trim).filter(|t| !t.is_empty());

    let game = game_repo::update(&db, path.into_inner(), title, info.date, info.bank_cost)
        .await?
        .ok_or(ApiError::NotFound("Game not found"))?;
    Ok(HttpResponse::Ok().json(game))
}

/// DELETE /api/games/{id}
#[delete("/games/{id}")]
pub async fn remove(
    _admin: AdminSession,
    path: web::Path<Uuid>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    if !game_repo::delete(&db, id).await? {
        return Err(ApiError::NotFound("Game not found"));
    }
    log::info!("game {id} deleted");
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

/// POST /api/games/{id}/close
#[post("/games/{id}/close")]
pub async fn close(
    _admin: AdminSession,
    path: web::Path<Uuid>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    match game_repo::close(&db, path.into_inner()).await? {
        CloseOutcome::Closed(game) => {
            GAMES_CLOSED.inc();
            log::info!("game {} closed", game.id);
            Ok(HttpResponse::Ok().json(game))
        }
        CloseOutcome::AlreadyClosed => Err(ApiError::Conflict("Game already closed".into())),
        CloseOutcome::Missing => Err(ApiError::NotFound("Game not found")),
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list)
        .service(get_one)
        .service(create)
        .service(update)
        .service(remove)
        .service(close);
}
