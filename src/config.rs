//! Configuration module for environment variables and application settings

use anyhow::{anyhow, Context, Result};
use std::env;

/// Application configuration, loaded once at startup and injected into the
/// components that need it. Nothing reads the process environment after this.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secret used to sign session tokens. Required; the server refuses to
    /// start without it.
    pub jwt_secret: String,

    /// Session token lifetime in seconds.
    pub token_ttl_secs: i64,

    /// Postgres connection string. Required.
    pub database_url: String,

    /// Browser origins allowed to send credentialed requests.
    pub allowed_origins: Vec<String>,

    /// Server configuration
    pub server: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow!("JWT_SECRET environment variable is required"))?,

            token_ttl_secs: env::var("JWT_EXPIRES_IN")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .context("JWT_EXPIRES_IN must be a number of seconds")?,

            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow!("DATABASE_URL environment variable is required"))?,

            allowed_origins: parse_origins(
                &env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:4173".to_string()),
            ),

            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "4000".to_string())
                    .parse()
                    .context("PORT must be a valid port number")?,
            },
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_split_and_trimmed() {
        let origins = parse_origins("http://localhost:4173, https://movies.example.com ,");
        assert_eq!(
            origins,
            vec!["http://localhost:4173", "https://movies.example.com"]
        );
    }
}
