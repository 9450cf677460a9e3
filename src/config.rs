//! Server configuration from command-line flags and environment variables.
//!
//! Flags win over environment variables:
//! - `FAMREG_HOST` / `--host` - bind address (default `127.0.0.1`)
//! - `FAMREG_PORT` / `--port` - bind port (default `3000`)
//! - `FAMREG_DATABASE` / `--database` - SQLite file (default: platform data dir)
//! - `FAMREG_CORS_ORIGINS` / `--cors-origins` - comma-separated allowed origins

use std::path::PathBuf;

use axum::http::{HeaderValue, Method};
use clap::Parser;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::db::Database;

#[derive(Debug, Clone, Parser)]
pub struct ServerConfig {
    /// Address to bind the HTTP API to
    #[arg(long, env = "FAMREG_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port for HTTP API
    #[arg(short, long, env = "FAMREG_PORT", default_value_t = 3000)]
    pub port: u16,

    /// SQLite database file
    #[arg(long, env = "FAMREG_DATABASE")]
    pub database: Option<PathBuf>,

    /// Allowed CORS origins. Empty allows any origin.
    #[arg(long, env = "FAMREG_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Configuration from environment variables and defaults only.
    pub fn from_env() -> Self {
        Self::parse_from(["famreg"])
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Open and migrate the configured database.
    pub fn open_database(&self) -> anyhow::Result<Database> {
        let db = match &self.database {
            Some(path) => Database::open(path.clone())?,
            None => Database::open_default()?,
        };
        db.migrate()?;
        Ok(db)
    }

    pub fn cors_layer(&self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .cors_origins
            .iter()
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();

        if origins.is_empty() {
            return CorsLayer::permissive();
        }

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers(Any)
    }
}
