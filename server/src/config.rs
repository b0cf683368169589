//! Runtime configuration for the league server.

use anyhow::Context;
use std::env;

pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 12 * 60;
/// One year.
pub const MAX_SESSION_TTL_MINUTES: i64 = 365 * 24 * 60;

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub server_addr: String,
    pub max_connections: u32,
    /// Login e-mail of the single league admin.
    pub admin_email: String,
    /// Argon2 PHC string for the admin password.
    pub admin_password_hash: String,
    /// HMAC key for signing admin session tokens.
    pub session_secret: String,
    /// Lifetime of an admin session (minutes).
    pub session_ttl_minutes: i64,
    /// Mark the session cookie `Secure` (enable behind HTTPS).
    pub secure_cookies: bool,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into());

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);

        let admin_email = env::var("ADMIN_EMAIL").unwrap_or_default();
        let admin_password_hash = env::var("ADMIN_PASSWORD_HASH").unwrap_or_default();
        if admin_email.is_empty() || admin_password_hash.is_empty() {
            log::warn!("ADMIN_EMAIL / ADMIN_PASSWORD_HASH unset; admin login is disabled");
        }

        let session_secret = env::var("SESSION_SECRET").context("SESSION_SECRET must be set")?;
        if session_secret.len() < 32 {
            anyhow::bail!("SESSION_SECRET must be at least 32 characters");
        }

        let session_ttl_minutes = session_ttl(env::var("SESSION_TTL_MINUTES").ok().as_deref());

        let secure_cookies = env::var("SECURE_COOKIES")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Settings {
            database_url,
            server_addr,
            max_connections,
            admin_email,
            admin_password_hash,
            session_secret,
            session_ttl_minutes,
            secure_cookies,
        })
    }
}

/// Parse `SESSION_TTL_MINUTES`. Unset, unparsable or non-positive values fall
/// back to the default; anything above a year is capped.
pub fn session_ttl(raw: Option<&str>) -> i64 {
    match raw.and_then(|v| v.trim().parse::<i64>().ok()) {
        Some(m) if m > MAX_SESSION_TTL_MINUTES => {
            log::warn!("SESSION_TTL_MINUTES={m} capped to {MAX_SESSION_TTL_MINUTES}");
            MAX_SESSION_TTL_MINUTES
        }
        Some(m) if m > 0 => m,
        _ => DEFAULT_SESSION_TTL_MINUTES,
    }
}
