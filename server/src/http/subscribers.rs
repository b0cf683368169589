//! Newsletter subscribe / unsubscribe.

use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::db::subscriber_repo;
use crate::error::{is_unique_violation, ApiError, ApiResult};
use crate::http::auth::AdminSession;

#[derive(Deserialize)]
pub struct SubscribeReq {
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize)]
pub struct UnsubscribeReq {
    #[serde(default)]
    pub token: String,
}

/// Trimmed, lower-cased address if it looks like `local@domain`.
pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    let (local, domain) = email.split_once('@')?;
    let plausible = !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace);
    plausible.then_some(email)
}

/// POST /api/subscribe
#[post("/subscribe")]
pub async fn subscribe(
    info: web::Json<SubscribeReq>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    if info.email.trim().is_empty() {
        return Err(ApiError::BadRequest("Email is required".into()));
    }
    let email = normalize_email(&info.email)
        .ok_or_else(|| ApiError::BadRequest("Email is invalid".into()))?;

    match subscriber_repo::insert(&db, &email).await {
        Ok(sub) => Ok(HttpResponse::Created().json(sub)),
        Err(e) if is_unique_violation(&e) => Err(ApiError::Conflict("Already subscribed".into())),
        Err(e) => Err(e.into()),
    }
}

/// POST /api/unsubscribe
#[post("/unsubscribe")]
pub async fn unsubscribe(
    info: web::Json<UnsubscribeReq>,
    db: web::Data<PgPool>,
) -> ApiResult<HttpResponse> {
    let token = info.token.trim();
    if token.is_empty() {
        return Err(ApiError::BadRequest("Token is required".into()));
    }
    if !subscriber_repo::delete_by_token(&db, token).await? {
        return Err(ApiError::NotFound("Subscriber not found"));
    }
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

/// GET /api/subscribers
#[get("/subscribers")]
pub async fn list(_admin: AdminSession, db: web::Data<PgPool>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(subscriber_repo::list(&db).await?))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(subscribe).service(unsubscribe).service(list);
}
