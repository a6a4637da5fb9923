use std::str::FromStr;

use promptcademy_core::rotation::DEFAULT_UTC_OFFSET_MINUTES;

use crate::auth::jwt::JwtConfig;

/// Process configuration, read once at startup.
///
/// | Env Var                     | Default                 |
/// |-----------------------------|-------------------------|
/// | `HOST`                      | `0.0.0.0`               |
/// | `PORT`                      | `3000`                  |
/// | `CORS_ORIGINS`              | `http://localhost:5173` |
/// | `REQUEST_TIMEOUT_SECS`      | `30`                    |
/// | `DATABASE_URL`              | unset (in-memory store) |
/// | `LESSON_UTC_OFFSET_MINUTES` | `-300`                  |
/// | `SEED_ON_BOOT`              | `false`                 |
/// | `ADMIN_EMAIL`               | unset                   |
///
/// JWT settings are documented on [`JwtConfig::from_env`]; AI settings are
/// read by the coach crate. The request timeout is raised when it would not
/// outlast the coach timeout, see [`crate::router::request_timeout`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Comma-separated in `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// `None` runs on the in-memory store.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    /// Minutes east of UTC at which a new lesson day starts.
    pub lesson_utc_offset_minutes: i32,
    /// Insert the starter lessons when the catalog is empty.
    pub seed_on_boot: bool,
    /// Signups with this address become admins.
    pub admin_email: Option<String>,
}

impl ServerConfig {
    /// # Panics
    ///
    /// When a numeric variable does not parse.
    pub fn from_env() -> Self {
        Self {
            host: env_opt("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: env_parse("PORT", 3000),
            cors_origins: env_opt("CORS_ORIGINS")
                .unwrap_or_else(|| "http://localhost:5173".into())
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect(),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 30),
            database_url: env_opt("DATABASE_URL"),
            jwt: JwtConfig::from_env(),
            lesson_utc_offset_minutes: env_parse(
                "LESSON_UTC_OFFSET_MINUTES",
                DEFAULT_UTC_OFFSET_MINUTES,
            ),
            seed_on_boot: env_opt("SEED_ON_BOOT").is_some_and(|v| is_truthy(&v)),
            admin_email: env_opt("ADMIN_EMAIL"),
        }
    }

    /// Whether `email` is the configured admin address (case-insensitive).
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_email
            .as_deref()
            .is_some_and(|admin| admin.eq_ignore_ascii_case(email.trim()))
    }
}

/// Trimmed value of `key`; unset and blank are both `None`.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(key) {
        Some(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{key}={raw:?} is invalid: {e}")),
        None => default,
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
