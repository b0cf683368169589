//! Per-game chip entries: bulk reconcile, single removal, raw listing.

use actix_web::{delete, get, put, web, HttpResponse};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{entry_repo, game_repo, player_repo};
use crate::error::{ApiError, ApiResult};
use crate::http::auth::AdminSession;
use crate::league::reconcile::{self, EntryInput};
use crate::metrics::ENTRIES_UPSERTED;

/// GET /api/game-entries
#[get("/game-entries")]
pub async fn list_all(db: web::Data<PgPool>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(entry_repo::list_all(&db).await?))
}

/// PUT /api/games/{id}/entries
///
/// Body: `[{ playerId, boughtChips, leftChips }, ...]`. Upserts one entry per
/// listed player; players not listed keep their entries.
#[put("/games/{id}/entries")]
pub async fn put_entries(
    _admin: AdminSession,
    path: web::Path<Uuid>,
    info: web::Json<Vec<EntryInput>>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let game_id = path.into_inner();
    if !game_repo::exists(&db, game_id).await? {
        return Err(ApiError::NotFound("Game not found"));
    }

    let mut ids: Vec<Uuid> = info.iter().map(|r| r.player_id).collect();
    ids.sort_unstable();
    ids.dedup();
    let known = player_repo::existing_ids(&db, &ids).await?;
    let unknown: Vec<String> = ids
        .iter()
        .filter(|id| !known.contains(*id))
        .map(Uuid::to_string)
        .collect();
    if !unknown.is_empty() {
        log::warn!("entries for game {game_id} reference unknown players: {unknown:?}");
        return Err(ApiError::BadRequest(format!(
            "unknown player ids: {}",
            unknown.join(", ")
        )));
    }

    let applied = reconcile::reconcile(db.get_ref(), game_id, &info).await?;
    ENTRIES_UPSERTED.inc_by(applied as u64);
    log::info!("game {game_id}: {applied} entries reconciled");

    Ok(HttpResponse::Ok().json(json!({ "success": true, "applied": applied })))
}

/// DELETE /api/games/{id}/entries/{player_id}
#[delete("/games/{id}/entries/{player_id}")]
pub async fn remove_entry(
    _admin: AdminSession,
    path: web::Path<(Uuid, Uuid)>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let (game_id, player_id) = path.into_inner();
    if !entry_repo::delete(&db, game_id, player_id).await? {
        return Err(ApiError::NotFound("Entry not found"));
    }
    log::info!("game {game_id}: entry for player {player_id} removed");
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_all)
        .service(put_entries)
        .service(remove_entry);
}
