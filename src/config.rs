use log::warn;
use std::path::PathBuf;
use thiserror::Error;

const DEVELOPMENT_SECRET: &str = "secret";
const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const DEFAULT_CLIENT_URL: &str = "http://localhost:3000";
/// Ten years.
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;
const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://spot-movie.com", "http://www.spot-movie.com"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set when DATABASE_URL is set")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Location of the persistent store. `None` runs on a throwaway store
    /// filled with demo data.
    pub database_url: Option<PathBuf>,
    pub jwt_secret: String,
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub port: u16,
    pub client_url: String,
    pub allowed_origins: Vec<String>,
    pub bcrypt_cost: u32,
    pub token_ttl_hours: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(var: F) -> Result<Self, ConfigError> {
        let database_url = var("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .map(PathBuf::from);
        let production = database_url.is_some();

        let jwt_secret = match var("JWT_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            _ if production => return Err(ConfigError::Missing("JWT_SECRET")),
            _ => {
                warn!("JWT_SECRET is not set, using the development secret");
                DEVELOPMENT_SECRET.to_owned()
            }
        };

        let tmdb_api_key = var("API_KEY").unwrap_or_else(|| {
            warn!("API_KEY is not set, metadata provider requests will fail");
            String::new()
        });

        let allowed_origins = match var("ALLOWED_ORIGINS") {
            Some(origins) => origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_owned)
                .collect(),
            None => DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        let token_ttl_hours = parse(&var, "TOKEN_TTL_HOURS", 24 * 7)?;
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&token_ttl_hours) {
            return Err(ConfigError::Invalid {
                key: "TOKEN_TTL_HOURS",
                value: token_ttl_hours.to_string(),
            });
        }

        Ok(Config {
            database_url,
            jwt_secret,
            tmdb_api_key,
            tmdb_base_url: var("TMDB_BASE_URL").unwrap_or_else(|| DEFAULT_TMDB_BASE_URL.to_owned()),
            port: parse(&var, "PORT", 3030)?,
            client_url: var("CLIENT_URL").unwrap_or_else(|| DEFAULT_CLIENT_URL.to_owned()),
            allowed_origins,
            bcrypt_cost: parse(&var, "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            token_ttl_hours,
        })
    }

    pub fn is_production(&self) -> bool {
        self.database_url.is_some()
    }
}

fn parse<F, T>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match var(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
pub fn test_config() -> Config {
    Config {
        database_url: None,
        jwt_secret: "test-secret".to_owned(),
        tmdb_api_key: "test-key".to_owned(),
        tmdb_base_url: "http://127.0.0.1:9".to_owned(),
        port: 0,
        client_url: DEFAULT_CLIENT_URL.to_owned(),
        allowed_origins: Vec::new(),
        bcrypt_cost: 4,
        token_ttl_hours: 1,
    }
}
