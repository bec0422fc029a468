//! User routes: registration, listing, and the favorites/watchlist toggles

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::Extension;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::models::AuthUser;
use crate::auth::service::hash_password;
use crate::database::models::{Collection, User};
use crate::database::store::CredentialStore;
use crate::error::ApiError;
use crate::routes::parse_id;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    pub name: Option<String>,
    #[serde(default)]
    pub password: String,
}

/// Toggle payload: which movie to flip in or out of the collection.
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    #[serde(rename = "movieId")]
    pub movie_id: String,
}

/// Full outward user representation, favorites and watchlist included.
/// The password hash stays behind.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub name: Option<String>,
    pub favorites: Vec<String>,
    pub watchlist: Vec<String>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            favorites: user.favorites,
            watchlist: user.watchlist,
        }
    }
}

/// POST /api/users
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let view = register_user(state.db.as_ref(), payload).await?;
    tracing::info!("registered user {}", view.username);
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/users
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<UserView>>, ApiError> {
    let users = state.db.list_users().await?;
    Ok(Json(users.into_iter().map(UserView::from).collect()))
}

/// PUT /api/users/{id}/favorites
pub async fn toggle_favorites(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<UserView>, ApiError> {
    let view = toggle(
        state.db.as_ref(),
        &auth_user,
        &id,
        Collection::Favorites,
        &payload.movie_id,
    )
    .await?;
    Ok(Json(view))
}

/// PUT /api/users/{id}/watchlist
pub async fn toggle_watchlist(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<UserView>, ApiError> {
    let view = toggle(
        state.db.as_ref(),
        &auth_user,
        &id,
        Collection::Watchlist,
        &payload.movie_id,
    )
    .await?;
    Ok(Json(view))
}

async fn register_user(
    store: &dyn CredentialStore,
    payload: RegisterRequest,
) -> Result<UserView, ApiError> {
    if payload.username.trim().is_empty() {
        return Err(ApiError::Validation("username is required".to_string()));
    }
    // Character count, not byte count: multibyte passwords measure the
    // same way the client-side check measures them.
    if payload.password.chars().count() < 6 {
        return Err(ApiError::Validation(
            "password must be at least 6 chars".to_string(),
        ));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = store
        .create_user(
            payload.username.trim(),
            payload.name.as_deref(),
            &password_hash,
        )
        .await?;
    Ok(UserView::from(user))
}

/// Flip membership of a movie in one of the caller's own collections. A
/// caller targeting another user's collections is refused outright, valid
/// session or not.
async fn toggle(
    store: &dyn CredentialStore,
    auth_user: &AuthUser,
    target_id: &str,
    collection: Collection,
    movie_id: &str,
) -> Result<UserView, ApiError> {
    let target_id = parse_id(target_id)?;
    if auth_user.id != target_id {
        return Err(ApiError::Forbidden);
    }

    let user = store
        .toggle_collection(target_id, collection, movie_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;
    Ok(UserView::from(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::store::memory::MemoryStore;

    fn request(username: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            name: None,
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let store = MemoryStore::new();

        let first = register_user(&store, request("alice", "secret1")).await;
        assert!(first.is_ok());

        let second = register_user(&store, request("alice", "secret2"))
            .await
            .unwrap_err();
        assert_eq!(second.status(), StatusCode::CONFLICT);
        assert_eq!(second.to_string(), "username already exists");
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let store = MemoryStore::new();
        let err = register_user(&store, request("alice", "12345"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn password_length_is_counted_in_characters() {
        let store = MemoryStore::new();

        // Three characters, six bytes: still too short.
        let err = register_user(&store, request("alice", "ñññ"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        // Six characters is enough whatever the byte count.
        assert!(register_user(&store, request("alice", "señora"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn empty_username_is_rejected() {
        let store = MemoryStore::new();
        let err = register_user(&store, request("  ", "secret1"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn toggle_twice_returns_to_original_state() {
        let store = MemoryStore::new();
        let user = store.insert("alice", None, "hash").await;
        let auth = AuthUser {
            id: user.id,
            username: user.username.clone(),
        };
        let id = user.id.to_string();

        let view = toggle(&store, &auth, &id, Collection::Favorites, "m1")
            .await
            .unwrap();
        assert_eq!(view.favorites, vec!["m1".to_string()]);

        let view = toggle(&store, &auth, &id, Collection::Favorites, "m1")
            .await
            .unwrap();
        assert!(view.favorites.is_empty());
    }

    #[tokio::test]
    async fn toggling_another_users_collection_is_forbidden() {
        let store = MemoryStore::new();
        let alice = store.insert("alice", None, "hash").await;
        let bob = store.insert("bob", None, "hash").await;
        let auth = AuthUser {
            id: alice.id,
            username: alice.username.clone(),
        };

        let err = toggle(
            &store,
            &auth,
            &bob.id.to_string(),
            Collection::Watchlist,
            "m1",
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn malformed_target_id_is_a_bad_request() {
        let store = MemoryStore::new();
        let user = store.insert("alice", None, "hash").await;
        let auth = AuthUser {
            id: user.id,
            username: user.username.clone(),
        };

        let err = toggle(&store, &auth, "not-a-uuid", Collection::Favorites, "m1")
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "malformatted id");
    }
}
