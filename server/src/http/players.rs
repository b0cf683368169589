//! Player roster (list / get / create / rename / delete)

use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::player_repo;
use crate::error::{is_unique_violation, ApiError, ApiResult};
use crate::http::auth::AdminSession;

#[derive(Deserialize)]
pub struct CreateReq {
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// `avatar: null` clears the avatar; leaving the key out keeps it.
#[derive(Deserialize)]
pub struct UpdateReq {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub avatar: Option<Option<String>>,
}

fn name_taken(name: &str) -> ApiError {
    ApiError::Conflict(format!("player name '{name}' already taken"))
}

/// GET /api/players
#[get("/players")]
pub async fn list(db: web::Data<PgPool>) -> ApiResult<HttpResponse> {
    let players = player_repo::list(&db).await?;
    Ok(HttpResponse::Ok().json(players))
}

/// GET /api/players/{id}
#[get("/players/{id}")]
pub async fn get_one(path: web::Path<Uuid>, db: web::Data<PgPool>) -> ApiResult<HttpResponse> {
    let player = player_repo::find(&db, path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("Player not found"))?;
    Ok(HttpResponse::Ok().json(player))
}

/// POST /api/players
#[post("/players")]
pub async fn create(
    _admin: AdminSession,
    info: web::Json<CreateReq>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let name = info.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("name is required".into()));
    }

    match player_repo::insert(&db, name, info.avatar.as_deref()).await {
        Ok(player) => {
            log::info!("player {} created ({})", player.name, player.id);
            Ok(HttpResponse::Created().json(player))
        }
        Err(e) if is_unique_violation(&e) => Err(name_taken(name)),
        Err(e) => Err(e.into()),
    }
}

/// PATCH /api/players/{id}
#[patch("/players/{id}")]
pub async fn update(
    _admin: AdminSession,
    path: web::Path<Uuid>,
    info: web::Json<UpdateReq>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let name = info.name.as_deref().map(str::trim);
    if name == Some("") {
        return Err(ApiError::BadRequest("name must not be blank".into()));
    }

    match player_repo::update(&db, path.into_inner(), name, info.avatar.as_ref().map(Option::as_deref)).await {
        Ok(Some(player)) => Ok(HttpResponse::Ok().json(player)),
        Ok(None) => Err(ApiError::NotFound("Player not found")),
        Err(e) if is_unique_violation(&e) => Err(name_taken(name.unwrap_or_default())),
        Err(e) => Err(e.into()),
    }
}

/// DELETE /api/players/{id}
///
/// The player's game entries are removed with them.
#[delete("/players/{id}")]
pub async fn remove(
    _admin: AdminSession,
    path: web::Path<Uuid>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    if !player_repo::delete(&db, id).await? {
        return Err(ApiError::NotFound("Player not found"));
    }
    log::info!("player {id} deleted");
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list)
        .service(get_one)
        .service(create)
        .service(update)
        .service(remove);
}
