use std::env;
use url::Url;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreKind,
    /// Unset when the memory store is selected.
    pub database_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| AppError::Config(format!("Invalid PORT '{}': {}", raw, e)))?,
            None => 3000,
        };

        let store = match lookup("STORE").as_deref().map(str::to_lowercase).as_deref() {
            None | Some("postgres") => StoreKind::Postgres,
            Some("memory") => StoreKind::Memory,
            Some(other) => {
                return Err(AppError::Config(format!("Unknown STORE '{}'", other)));
            }
        };

        let database_url = match store {
            StoreKind::Memory => None,
            StoreKind::Postgres => Some(database_url(&lookup)?),
        };

        Ok(Self {
            host,
            port,
            store,
            database_url,
        })
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

/// `DATABASE_URL` wins; otherwise the URL is assembled from `DB_USER`,
/// `DB_PASSWORD`, `DB_HOST` and `DB_NAME`.
fn database_url(lookup: &impl Fn(&str) -> Option<String>) -> Result<String, AppError> {
    if let Some(url) = lookup("DATABASE_URL") {
        return Ok(url);
    }

    let require = |key: &str| {
        lookup(key).ok_or_else(|| {
            AppError::Config(format!("DATABASE_URL or {} must be set", key))
        })
    };
    let user = require("DB_USER")?;
    let name = require("DB_NAME")?;
    let password = lookup("DB_PASSWORD").unwrap_or_default();
    let host = lookup("DB_HOST").unwrap_or_else(|| "localhost:5432".to_string());

    let invalid = |what: &str| AppError::Config(format!("invalid {} for the database URL", what));
    let mut url = Url::parse(&format!("postgres://{}/{}", host, name))
        .map_err(|err| AppError::Config(format!("invalid DB_HOST or DB_NAME: {}", err)))?;
    url.set_username(&user).map_err(|_| invalid("DB_USER"))?;
    if !password.is_empty() {
        url.set_password(Some(&password))
            .map_err(|_| invalid("DB_PASSWORD"))?;
    }
    Ok(url.to_string())
}
