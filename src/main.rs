//! # Movie Catalog Server
//!
//! REST backend for a movie catalog: movie CRUD with search and filtering,
//! user registration, cookie/JWT session authentication with a CSRF
//! double-submit check, and per-user favorites/watchlist collections.
//!
//! ## Architecture
//! - `server`: router assembly, CORS, listener
//! - `config`: environment variable configuration, loaded once at startup
//! - `auth`: session token codec, login service, and the session guard
//! - `database`: Postgres pool, migrations, models, and store operations
//! - `routes`: HTTP handlers organized by API domain
//!
//! ## Running the Server
//! ```bash
//! JWT_SECRET=... DATABASE_URL=postgres://... cargo run
//! ```
//!
//! The server listens on port 4000 by default; `/api/health` answers once
//! it is up.

mod auth;
mod config;
mod database;
mod error;
mod routes;
mod server;

use dotenv::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Application entry point.
///
/// Loads configuration, initializes the tracing subscriber, and starts the
/// HTTP server. A missing signing secret or database URL aborts startup;
/// those are process-level failures, not per-request ones.
#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();

    tracing::info!(
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("configuration error: {err:#}");
            std::process::exit(1);
        }
    };

    if let Err(err) = server::start(config).await {
        tracing::error!("server error: {err:#}");
        std::process::exit(1);
    }
}
