use std::{env, path::PathBuf, str::FromStr};

use anyhow::{Context, anyhow};
use dotenvy::dotenv;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    /// `None` runs against the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub access_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_public_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    /// Admin account created at startup when missing; set both or neither.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,

    // Uploads
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,

    // Logging
    pub log_dir: PathBuf,
    pub log_level: tracing::Level,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |key: &str| lookup(key).ok_or_else(|| anyhow!("{key} must be set"));
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let admin_email = optional("ADMIN_EMAIL");
        let admin_password = optional("ADMIN_PASSWORD");
        if admin_email.is_some() != admin_password.is_some() {
            return Err(anyhow!("ADMIN_EMAIL and ADMIN_PASSWORD must be set together"));
        }

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: optional("DATABASE_URL"),
            jwt_secret: required("JWT_SECRET")?,
            access_token_ttl: parse_or(&lookup, "ACCESS_TOKEN_TTL", 28_800)?, // default 8 hours

            rate_login_per_min: parse_or(&lookup, "RATE_LOGIN_PER_MIN", 60)?,
            rate_public_per_min: parse_or(&lookup, "RATE_PUBLIC_PER_MIN", 30)?,
            rate_protected_per_min: parse_or(&lookup, "RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),

            admin_email,
            admin_password,

            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public/uploads")),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,

            log_dir: lookup("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("logs")),
            log_level: parse_or(&lookup, "LOG_LEVEL", tracing::Level::DEBUG)?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}
