//! # Server Module
//!
//! HTTP server setup and route configuration for the movie catalog server.

use anyhow::{Context, Result};
use axum::extract::Request;
use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{Json, Response};
use axum::routing::{get, post, put};
use axum::{middleware, Router};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::auth::jwt::TokenService;
use crate::auth::middleware::require_session;
use crate::auth::service::AuthService;
use crate::config::Config;
use crate::database::connection::DatabaseConnection;
use crate::database::store::CredentialStore;
use crate::routes;

/// Application state shared across all route handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub db: Arc<DatabaseConnection>,
}

/// Starts the movie catalog HTTP server.
///
/// Connects to Postgres, runs migrations, wires the authentication service
/// from the injected configuration, and serves the API until the process is
/// terminated.
pub async fn start(config: Config) -> Result<()> {
    let db = Arc::new(
        DatabaseConnection::from_url(&config.database_url)
            .await
            .context("failed to connect to database")?,
    );
    db.migrate().await?;

    let tokens = TokenService::new(&config.jwt_secret, config.token_ttl_secs);
    let store: Arc<dyn CredentialStore> = db.clone();
    let auth = Arc::new(AuthService::new(store, tokens));

    let app_state = AppState {
        auth: auth.clone(),
        db,
    };

    // Reads are public; every mutation sits behind the session guard.
    let public_routes = Router::new()
        .route("/api/health", get(routes::health::health))
        .route("/api/login", post(routes::auth::login))
        .route("/api/login/me", get(routes::auth::me))
        .route("/api/login/logout", post(routes::auth::logout))
        .route(
            "/api/users",
            post(routes::users::register).get(routes::users::list),
        )
        .route("/api/movies", get(routes::movies::list))
        .route("/api/movies/{id}", get(routes::movies::get_by_id));

    let protected_routes = Router::new()
        .route("/api/movies", post(routes::movies::create))
        .route(
            "/api/movies/{id}",
            put(routes::movies::update).delete(routes::movies::remove),
        )
        .route(
            "/api/users/{id}/favorites",
            put(routes::users::toggle_favorites),
        )
        .route(
            "/api/users/{id}/watchlist",
            put(routes::users::toggle_watchlist),
        )
        .layer(middleware::from_fn_with_state(auth, require_session));

    let csrf_header = HeaderName::from_static("x-csrf-token");
    let mut origins = Vec::with_capacity(config.allowed_origins.len());
    for origin in &config.allowed_origins {
        origins.push(
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid origin in ALLOWED_ORIGINS: {origin}"))?,
        );
    }

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(unknown_endpoint)
        .layer(middleware::from_fn(log_request))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::ORIGIN,
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                    csrf_header.clone(),
                ])
                // The page script must be able to read the anti-forgery
                // value off login responses.
                .expose_headers([csrf_header])
                // Cookies ride along on credentialed requests.
                .allow_credentials(true),
        )
        .with_state(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr} - port may already be in use"))?;

    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Health check available at http://{}/api/health", addr);

    axum::serve(listener, app).await.context("server error")
}

/// Log every inbound request with the status it resolved to.
async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    tracing::info!("{} {} {}", method, path, response.status().as_u16());
    response
}

async fn unknown_endpoint() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "unknown endpoint" })),
    )
}
