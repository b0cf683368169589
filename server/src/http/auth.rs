//! Admin session (signed JWT in an HttpOnly cookie)

use actix_web::{
    cookie::{Cookie, SameSite},
    get, post, web, HttpResponse,
};
use anyhow::Context;
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::Settings;
use crate::error::{ApiError, ApiResult};

pub const SESSION_COOKIE: &str = "admin_session";
const ADMIN_SUBJECT: &str = "admin";

//////////////////////////////////////////////////
// Data structs
//////////////////////////////////////////////////

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
}

//////////////////////////////////////////////////
// ─────────────  AdminSession extractor  ─────────────
//////////////////////////////////////////////////

pub mod extractor {
    use super::{Claims, ADMIN_SUBJECT, SESSION_COOKIE};
    use crate::{config::Settings, error::ApiError};
    use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
    use futures_util::future::{ready, Ready};
    use jsonwebtoken::{decode, DecodingKey, Validation};

    const UNAUTHORIZED: &str = "Unauthorized";

    /// Proof that the request carries a valid, unexpired admin session.
    /// Put it first in a handler's arguments to gate the route.
    #[derive(Debug, Clone)]
    pub struct AdminSession;

    impl FromRequest for AdminSession {
        type Error = ApiError;
        type Future = Ready<Result<Self, Self::Error>>;

        fn from_request(req: &HttpRequest, _pl: &mut Payload) -> Self::Future {
            let res = (|| -> Result<AdminSession, ApiError> {
                let settings = req
                    .app_data::<web::Data<Settings>>()
                    .ok_or(ApiError::Unauthorized(UNAUTHORIZED))?;
                let cookie = req
                    .cookie(SESSION_COOKIE)
                    .ok_or(ApiError::Unauthorized(UNAUTHORIZED))?;

                let data = decode::<Claims>(
                    cookie.value(),
                    &DecodingKey::from_secret(settings.session_secret.as_bytes()),
                    &Validation::default(),
                )
                .map_err(|_| ApiError::Unauthorized(UNAUTHORIZED))?;

                if data.claims.sub != ADMIN_SUBJECT {
                    return Err(ApiError::Unauthorized(UNAUTHORIZED));
                }
                Ok(AdminSession)
            })();

            ready(res)
        }
    }
}
pub use extractor::AdminSession;

/// Check `email` / `password` against the configured admin credentials.
pub fn verify_credentials(settings: &Settings, email: &str, password: &str) -> bool {
    if settings.admin_email.is_empty() || email != settings.admin_email {
        return false;
    }
    let Ok(hash) = PasswordHash::new(&settings.admin_password_hash) else {
        log::error!("ADMIN_PASSWORD_HASH is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .is_ok()
}

/// Mint a signed session token valid for the configured TTL.
pub fn issue_token(settings: &Settings) -> anyhow::Result<String> {
    let exp = Duration::try_minutes(settings.session_ttl_minutes)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .context("session TTL out of range")?
        .timestamp();
    let claims = Claims {
        sub: ADMIN_SUBJECT.to_string(),
        exp: usize::try_from(exp)?,
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.session_secret.as_bytes()),
    )?)
}

fn session_cookie(settings: &Settings, value: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, value)
        .http_only(true)
        .secure(settings.secure_cookies)
        .path("/")
        .same_site(SameSite::Strict)
        .finish()
}

//////////////////////////////////////////////////
// POST /api/admin/login
//////////////////////////////////////////////////
#[post("/admin/login")]
pub async fn login(
    info: web::Json<LoginRequest>,
    settings: web::Data<Settings>,
) -> ApiResult<HttpResponse> {
    if info.email.trim().is_empty() || info.password.is_empty() {
        return Err(ApiError::BadRequest("Email and password required".into()));
    }
    if !verify_credentials(&settings, info.email.trim(), &info.password) {
        log::warn!("rejected admin login for {}", info.email);
        return Err(ApiError::Unauthorized("Invalid credentials"));
    }

    let token = issue_token(&settings)?;
    log::info!("admin session opened");
    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&settings, token))
        .json(json!({ "success": true, "isAdmin": true })))
}

//////////////////////////////////////////////////
// POST|GET /api/admin/logout
//////////////////////////////////////////////////
async fn logout(settings: web::Data<Settings>) -> HttpResponse {
    let mut cookie = session_cookie(&settings, String::new());
    cookie.make_removal();
    HttpResponse::Ok()
        .cookie(cookie)
        .json(json!({ "success": true }))
}

//////////////////////////////////////////////////
// GET /api/admin/session
//////////////////////////////////////////////////
#[get("/admin/session")]
pub async fn session(admin: Option<AdminSession>) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "isAdmin": admin.is_some() }))
}

//////////////////////////////////////////////////
// Mount
//////////////////////////////////////////////////
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(login)
        .service(session)
        .service(
            web::resource("/admin/logout")
                .route(web::post().to(logout))
                .route(web::get().to(logout)),
        );
}
