//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `UserStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! Defaulting rules for the document-shaped columns (preferences, favorites)
//! are applied here, at the read boundary, so the rest of the application
//! never sees a partially-populated record.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use news_core::domain::{Favorite, Preferences, User, UserCredentials};
use news_core::ports::{PortError, PortResult, UserStore};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `UserStore` port.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Creates a new `PgUserStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

/// The stored shape of the preferences document. Every field is optional so
/// that users created before a field existed still read cleanly; defaults
/// are resolved in `to_domain`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PreferencesDoc {
    #[serde(default)]
    topics: Vec<String>,
    article_count: Option<u32>,
    language: Option<String>,
}

impl PreferencesDoc {
    fn to_domain(self) -> Preferences {
        Preferences {
            topics: self.topics,
            article_count: self
                .article_count
                .unwrap_or(Preferences::DEFAULT_ARTICLE_COUNT),
            language: self
                .language
                .unwrap_or_else(|| Preferences::DEFAULT_LANGUAGE.to_string()),
        }
    }

    fn from_domain(prefs: &Preferences) -> Self {
        Self {
            topics: prefs.topics.clone(),
            article_count: Some(prefs.article_count),
            language: Some(prefs.language.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FavoriteDoc {
    url: String,
    title: String,
    source: String,
    published: String,
}

impl FavoriteDoc {
    fn to_domain(self) -> Favorite {
        Favorite {
            url: self.url,
            title: self.title,
            source: self.source,
            published: self.published,
        }
    }

    fn from_domain(favorite: &Favorite) -> Self {
        Self {
            url: favorite.url.clone(),
            title: favorite.title.clone(),
            source: favorite.source.clone(),
            published: favorite.published.clone(),
        }
    }
}

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    email: String,
    display_name: String,
    preferences: Json<PreferencesDoc>,
    favorites: Json<Vec<FavoriteDoc>>,
    created_at: DateTime<Utc>,
}

impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
            display_name: self.display_name,
            preferences: self.preferences.0.to_domain(),
            favorites: self.favorites.0.into_iter().map(FavoriteDoc::to_domain).collect(),
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    id: Uuid,
    email: String,
    password_hash: String,
}

impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.id,
            email: self.email,
            password_hash: self.password_hash,
        }
    }
}

//=========================================================================================
// Pure favorites-list helpers
//=========================================================================================

/// Set-semantics insert: returns false (list unchanged) when the url is
/// already present.
fn add_entry(list: &mut Vec<FavoriteDoc>, entry: FavoriteDoc) -> bool {
    if list.iter().any(|f| f.url == entry.url) {
        return false;
    }
    list.push(entry);
    true
}

/// Returns false (list unchanged) when no entry carries the url.
fn remove_entry(list: &mut Vec<FavoriteDoc>, url: &str) -> bool {
    let before = list.len();
    list.retain(|f| f.url != url);
    list.len() != before
}

//=========================================================================================
// `UserStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(
        &self,
        email: &str,
        display_name: &str,
        password_hash: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, email, display_name, password_hash) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, email, display_name, preferences, favorites, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(display_name)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                PortError::Conflict(format!("a user with email {} already exists", email))
            }
            _ => PortError::Unexpected(e.to_string()),
        })?;

        Ok(record.to_domain())
    }

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(record.map(CredentialsRecord::to_domain))
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, display_name, preferences, favorites, created_at \
             FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?
        .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;

        Ok(record.to_domain())
    }

    async fn get_credentials_by_id(&self, user_id: Uuid) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, email, password_hash FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?
        .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;

        Ok(record.to_domain())
    }

    async fn update_account(
        &self,
        user_id: Uuid,
        display_name: &str,
        password_hash: &str,
    ) -> PortResult<()> {
        let result =
            sqlx::query("UPDATE users SET display_name = $2, password_hash = $3 WHERE id = $1")
                .bind(user_id)
                .bind(display_name)
                .bind(password_hash)
                .execute(&self.pool)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }

    async fn update_preferences(&self, user_id: Uuid, prefs: &Preferences) -> PortResult<()> {
        let result = sqlx::query("UPDATE users SET preferences = $2 WHERE id = $1")
            .bind(user_id)
            .bind(Json(PreferencesDoc::from_domain(prefs)))
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }

    async fn add_favorite(&self, user_id: Uuid, favorite: &Favorite) -> PortResult<()> {
        // Row lock keeps the read-modify-write atomic per user document.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let favorites: Option<Json<Vec<FavoriteDoc>>> =
            sqlx::query_scalar("SELECT favorites FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let mut list = favorites
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?
            .0;

        if add_entry(&mut list, FavoriteDoc::from_domain(favorite)) {
            sqlx::query("UPDATE users SET favorites = $2 WHERE id = $1")
                .bind(user_id)
                .bind(Json(&list))
                .execute(&mut *tx)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn remove_favorite(&self, user_id: Uuid, url: &str) -> PortResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let favorites: Option<Json<Vec<FavoriteDoc>>> =
            sqlx::query_scalar("SELECT favorites FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let mut list = favorites
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?
            .0;

        if remove_entry(&mut list, url) {
            sqlx::query("UPDATE users SET favorites = $2 WHERE id = $1")
                .bind(user_id)
                .bind(Json(&list))
                .execute(&mut *tx)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn count_users(&self) -> PortResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(count as u64)
    }

    async fn delete_all_users(&self) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM users")
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(url: &str) -> FavoriteDoc {
        FavoriteDoc {
            url: url.to_string(),
            title: "A title".to_string(),
            source: "Wire".to_string(),
            published: "2025-07-21T14:45:56Z".to_string(),
        }
    }

    #[test]
    fn favorite_add_is_idempotent() {
        let mut list = Vec::new();
        assert!(add_entry(&mut list, doc("https://example.com/a")));
        assert!(!add_entry(&mut list, doc("https://example.com/a")));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn favorite_remove_of_absent_url_is_a_no_op() {
        let mut list = vec![doc("https://example.com/a")];
        assert!(!remove_entry(&mut list, "https://example.com/missing"));
        assert_eq!(list.len(), 1);
        assert!(remove_entry(&mut list, "https://example.com/a"));
        assert!(list.is_empty());
    }

    #[test]
    fn missing_preference_fields_resolve_to_defaults() {
        let parsed: PreferencesDoc = serde_json::from_str("{}").unwrap();
        let prefs = parsed.to_domain();
        assert!(prefs.topics.is_empty());
        assert_eq!(prefs.article_count, 10);
        assert_eq!(prefs.language, "en");
    }

    #[test]
    fn stored_preference_fields_survive_the_round_to_domain() {
        let parsed: PreferencesDoc =
            serde_json::from_str(r#"{"topics":["Space"],"article_count":5,"language":"en"}"#)
                .unwrap();
        let prefs = parsed.to_domain();
        assert_eq!(prefs.topics, vec!["Space".to_string()]);
        assert_eq!(prefs.article_count, 5);
    }
}
