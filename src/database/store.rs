//! Store operations
//!
//! Both stores are traits so handlers and the authentication service can be
//! exercised against in-memory doubles: Postgres-backed in production,
//! in-memory in tests.

use async_trait::async_trait;
use thiserror::Error;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::ToSql;
use uuid::Uuid;

use crate::database::connection::DatabaseConnection;
use crate::database::models::{Collection, FromRow, Movie, MovieInput, User};

#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique-constraint violation, reported distinctly so the API can
    /// answer 409 instead of a generic failure.
    #[error("duplicate key")]
    Duplicate,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(err: tokio_postgres::Error) -> Self {
        if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
            StoreError::Duplicate
        } else {
            StoreError::Backend(err.into())
        }
    }
}

impl From<deadpool_postgres::PoolError> for StoreError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        StoreError::Backend(err.into())
    }
}

/// Persistence for user records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// Create a user. A duplicate username yields `StoreError::Duplicate`.
    async fn create_user(
        &self,
        username: &str,
        name: Option<&str>,
        password_hash: &str,
    ) -> Result<User, StoreError>;

    /// Toggle `movie_id` in the user's collection, atomically within one
    /// request. Returns the updated user, or `None` if the id is unknown.
    async fn toggle_collection(
        &self,
        id: Uuid,
        collection: Collection,
        movie_id: &str,
    ) -> Result<Option<User>, StoreError>;
}

#[async_trait]
impl CredentialStore for DatabaseConnection {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let client = self.pool().get().await?;
        let row = client
            .query_opt("SELECT * FROM users WHERE username = $1", &[&username])
            .await?;
        row.map(|r| User::from_row(&r)).transpose().map_err(Into::into)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let client = self.pool().get().await?;
        let row = client
            .query_opt("SELECT * FROM users WHERE id = $1", &[&id])
            .await?;
        row.map(|r| User::from_row(&r)).transpose().map_err(Into::into)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let client = self.pool().get().await?;
        let rows = client
            .query("SELECT * FROM users ORDER BY username", &[])
            .await?;
        rows.iter()
            .map(|r| User::from_row(r).map_err(Into::into))
            .collect()
    }

    async fn create_user(
        &self,
        username: &str,
        name: Option<&str>,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let client = self.pool().get().await?;
        let row = client
            .query_one(
                "INSERT INTO users (username, name, password_hash) \
                 VALUES ($1, $2, $3) RETURNING *",
                &[&username, &name, &password_hash],
            )
            .await?;
        User::from_row(&row).map_err(Into::into)
    }

    async fn toggle_collection(
        &self,
        id: Uuid,
        collection: Collection,
        movie_id: &str,
    ) -> Result<Option<User>, StoreError> {
        let column = collection.column();
        // Single statement, so the read-modify-write is atomic per request;
        // racing toggles on the same user are last-write-wins.
        let sql = format!(
            "UPDATE users SET {column} = CASE \
                WHEN $2 = ANY({column}) THEN array_remove({column}, $2) \
                ELSE array_append({column}, $2) END, \
             updated_at = NOW() \
             WHERE id = $1 RETURNING *"
        );
        let client = self.pool().get().await?;
        let row = client.query_opt(&sql, &[&id, &movie_id]).await?;
        row.map(|r| User::from_row(&r)).transpose().map_err(Into::into)
    }
}

/// Filters accepted by the movie listing endpoint.
#[derive(Debug, Default)]
pub struct MovieFilter {
    /// Case-insensitive title substring.
    pub q: Option<String>,
    /// Exact match against the provider list.
    pub provider: Option<String>,
}

/// Persistence for movie records.
#[async_trait]
pub trait MovieStore: Send + Sync {
    /// List movies matching the filter, newest release year first.
    async fn list_movies(&self, filter: &MovieFilter) -> Result<Vec<Movie>, StoreError>;

    async fn get_movie(&self, id: Uuid) -> Result<Option<Movie>, StoreError>;

    async fn create_movie(&self, input: &MovieInput) -> Result<Movie, StoreError>;

    async fn update_movie(&self, id: Uuid, input: &MovieInput)
        -> Result<Option<Movie>, StoreError>;

    /// Delete a movie. Returns whether a row was actually removed.
    async fn delete_movie(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Escape LIKE metacharacters so a search string only ever matches as a
/// plain substring.
fn escape_like(pattern: &str) -> String {
    pattern
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl MovieStore for DatabaseConnection {
    async fn list_movies(&self, filter: &MovieFilter) -> Result<Vec<Movie>, StoreError> {
        let q = filter.q.as_deref().map(escape_like);
        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();

        if let Some(q) = &q {
            params.push(q);
            conditions.push(format!("title ILIKE '%' || ${} || '%'", params.len()));
        }
        if let Some(provider) = &filter.provider {
            params.push(provider);
            conditions.push(format!("${} = ANY(provider)", params.len()));
        }

        let mut sql = String::from("SELECT * FROM movies");
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY year DESC, created_at DESC");

        let client = self.pool().get().await?;
        let rows = client.query(sql.as_str(), &params).await?;
        rows.iter()
            .map(|r| Movie::from_row(r).map_err(Into::into))
            .collect()
    }

    async fn get_movie(&self, id: Uuid) -> Result<Option<Movie>, StoreError> {
        let client = self.pool().get().await?;
        let row = client
            .query_opt("SELECT * FROM movies WHERE id = $1", &[&id])
            .await?;
        row.map(|r| Movie::from_row(&r)).transpose().map_err(Into::into)
    }

    async fn create_movie(&self, input: &MovieInput) -> Result<Movie, StoreError> {
        let client = self.pool().get().await?;
        let row = client
            .query_one(
                "INSERT INTO movies (title, director, year, genre, time, \"cast\", rating, provider) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
                &[
                    &input.title,
                    &input.director,
                    &input.year,
                    &input.genre,
                    &input.time,
                    &input.cast,
                    &input.rating,
                    &input.provider,
                ],
            )
            .await?;
        Movie::from_row(&row).map_err(Into::into)
    }

    async fn update_movie(
        &self,
        id: Uuid,
        input: &MovieInput,
    ) -> Result<Option<Movie>, StoreError> {
        let client = self.pool().get().await?;
        let row = client
            .query_opt(
                "UPDATE movies SET title = $2, director = $3, year = $4, genre = $5, \
                 time = $6, \"cast\" = $7, rating = $8, provider = $9, updated_at = NOW() \
                 WHERE id = $1 RETURNING *",
                &[
                    &id,
                    &input.title,
                    &input.director,
                    &input.year,
                    &input.genre,
                    &input.time,
                    &input.cast,
                    &input.rating,
                    &input.provider,
                ],
            )
            .await?;
        row.map(|r| Movie::from_row(&r)).transpose().map_err(Into::into)
    }

    async fn delete_movie(&self, id: Uuid) -> Result<bool, StoreError> {
        let client = self.pool().get().await?;
        let deleted = client
            .execute("DELETE FROM movies WHERE id = $1", &[&id])
            .await?;
        Ok(deleted > 0)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("alien"), "alien");
    }
}
