//! Simple liveness / readiness probe

use actix_web::{get, web, HttpResponse, Responder};
use sqlx::PgPool;

#[get("/healthz")]
pub async fn healthz(db: web::Data<PgPool>) -> impl Responder {
    if let Err(e) = sqlx::query("SELECT 1").execute(&**db).await {
        log::warn!("health check: database unreachable: {e}");
        return HttpResponse::ServiceUnavailable().body("db");
    }

    HttpResponse::Ok().body("ok")
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(healthz);
}
