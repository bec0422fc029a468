// Database Models
//
// Tokio-postgres compatible models for the catalog's two entities: users and
// movies. Serialized shapes match the public API contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

/// Trait for converting from tokio-postgres Row
pub trait FromRow {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error>
    where
        Self: Sized;
}

/// User account. The password hash never appears in any serialized output;
/// routes return views built from this record instead.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub favorites: Vec<String>,
    pub watchlist: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRow for User {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            name: row.try_get("name")?,
            password_hash: row.try_get("password_hash")?,
            favorites: row.try_get("favorites")?,
            watchlist: row.try_get("watchlist")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Which per-user collection a toggle targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Favorites,
    Watchlist,
}

impl Collection {
    pub fn column(&self) -> &'static str {
        match self {
            Collection::Favorites => "favorites",
            Collection::Watchlist => "watchlist",
        }
    }
}

/// Toggle membership of `movie_id` in a collection: remove if present, add
/// if absent. Mirrors the single-statement SQL the Postgres store runs.
pub fn toggle_membership(collection: &mut Vec<String>, movie_id: &str) {
    if let Some(pos) = collection.iter().position(|id| id == movie_id) {
        collection.remove(pos);
    } else {
        collection.push(movie_id.to_string());
    }
}

/// Movie record
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub director: String,
    pub year: i32,
    pub genre: Vec<String>,
    /// Runtime in minutes
    pub time: i32,
    pub cast: Vec<String>,
    pub rating: Option<f64>,
    pub provider: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRow for Movie {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            director: row.try_get("director")?,
            year: row.try_get("year")?,
            genre: row.try_get("genre")?,
            time: row.try_get("time")?,
            cast: row.try_get("cast")?,
            rating: row.try_get("rating")?,
            provider: row.try_get("provider")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Payload for creating or fully replacing a movie.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub genre: Vec<String>,
    #[serde(default)]
    pub time: i32,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub provider: Vec<String>,
}

impl MovieInput {
    /// Field-level validation matching the catalog's schema constraints.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is required".to_string());
        }
        if self.director.trim().is_empty() {
            return Err("director is required".to_string());
        }
        if self.year < 1888 {
            return Err("year must be 1888 or later".to_string());
        }
        if self.time < 1 {
            return Err("time must be at least 1 minute".to_string());
        }
        if let Some(rating) = self.rating {
            if !(0.0..=10.0).contains(&rating) {
                return Err("rating must be between 0 and 10".to_string());
            }
        }
        Ok(())
    }
}
