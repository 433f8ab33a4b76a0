use anyhow::{anyhow, Context, Result};
use std::env;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:3001",
    "http://localhost:5173",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    /// Enables `DELETE /api/inventory`. Off in production.
    pub test_mode: bool,
    pub db_max_connections: u32,
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL")
            .and_then(|value| normalize_optional(&value))
            .ok_or_else(|| anyhow!("DATABASE_URL must be set"))?;

        let host = lookup("HOST")
            .and_then(|value| normalize_optional(&value))
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
            .parse::<IpAddr>()
            .context("Failed to parse HOST")?;

        let port = lookup("PORT")
            .map(|value| value.trim().parse::<u16>())
            .transpose()
            .context("Failed to parse PORT")?
            .unwrap_or(DEFAULT_PORT);

        let test_mode = lookup("INVENTORY_TEST_MODE")
            .map(|value| parse_bool(&value))
            .unwrap_or(false);

        let db_max_connections = lookup("DB_MAX_CONNECTIONS")
            .map(|value| value.trim().parse::<u32>())
            .transpose()
            .context("Failed to parse DB_MAX_CONNECTIONS")?
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
        if db_max_connections == 0 {
            return Err(anyhow!("DB_MAX_CONNECTIONS must be at least 1"));
        }

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|value| parse_origins(&value))
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect());

        Ok(Self {
            database_url,
            host,
            port,
            test_mode,
            db_max_connections,
            cors_allowed_origins,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }
}

pub fn load_config() -> Result<Config> {
    Config::from_env()
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter_map(normalize_optional)
        .collect()
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
