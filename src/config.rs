use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use sea_orm::DatabaseConnection;
use thiserror::Error;

use crate::services::storage_service::BlobStore;
use crate::utils::jwt_utils::JwtUtils;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// What happens to a user's articles and comments when the user is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserDeletePolicy {
    /// Delete the user's comments, articles (with their comments) and the user.
    Cascade,
    /// Refuse while the user still owns articles or comments.
    Block,
}

impl FromStr for UserDeletePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cascade" => Ok(UserDeletePolicy::Cascade),
            "block" => Ok(UserDeletePolicy::Block),
            other => Err(other.to_string()),
        }
    }
}

/// Status filtering on the public search / category / tag listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListingPolicy {
    pub published_only: bool,
}

#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub run_migrations: bool,
    pub jwt_secret: String,
    pub jwt_expires_in: i64,
    pub upload_dir: PathBuf,
    pub user_delete_policy: UserDeletePolicy,
    pub listing_policy: ListingPolicy,
    pub admin_bootstrap: Option<AdminBootstrap>,
}

#[derive(Clone, axum::extract::FromRef)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt: JwtUtils,
    pub blob_store: Arc<dyn BlobStore>,
    pub user_delete_policy: UserDeletePolicy,
    pub listing_policy: ListingPolicy,
}

impl AppState {
    pub fn new(cfg: &Config, db: DatabaseConnection, blob_store: Arc<dyn BlobStore>) -> Self {
        Self {
            db,
            jwt: JwtUtils::new(&cfg.jwt_secret, cfg.jwt_expires_in),
            blob_store,
            user_delete_policy: cfg.user_delete_policy,
            listing_policy: cfg.listing_policy,
        }
    }
}

impl Config {
    pub fn init() -> Result<Config, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `init` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let server_port = parse_or(&lookup, "PORT", 3000u16)?;

        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let run_migrations = parse_bool_or(&lookup, "RUN_MIGRATIONS", true)?;

        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let jwt_expires_in = parse_or(&lookup, "JWT_EXPIRATION_MINUTES", 60i64)?;

        let upload_dir = PathBuf::from(lookup("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string()));

        let user_delete_policy = match lookup("USER_DELETE_POLICY") {
            Some(raw) => raw.parse().map_err(|value| ConfigError::Invalid {
                key: "USER_DELETE_POLICY",
                value,
            })?,
            None => UserDeletePolicy::Block,
        };

        let listing_policy = ListingPolicy {
            published_only: parse_bool_or(&lookup, "PUBLIC_LISTINGS_PUBLISHED_ONLY", false)?,
        };

        let admin_bootstrap = match (lookup("ADMIN_USERNAME"), lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
            (Some(username), Some(email), Some(password)) => Some(AdminBootstrap { username, email, password }),
            _ => None,
        };

        Ok(Config {
            server_host,
            server_port,
            database_url,
            run_migrations,
            jwt_secret,
            jwt_expires_in,
            upload_dir,
            user_delete_policy,
            listing_policy,
            admin_bootstrap,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

fn parse_bool_or<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { key, value: raw }),
        },
        None => Ok(default),
    }
}
