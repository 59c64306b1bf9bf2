//! crates/news_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Article, Favorite, Preferences, User, UserCredentials};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Upstream service failure: {0}")]
    Upstream(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates a user. The email must be unique; a duplicate surfaces as an
    /// error from the store's unique index.
    async fn create_user(
        &self,
        email: &str,
        display_name: &str,
        password_hash: &str,
    ) -> PortResult<User>;

    /// Looks up login credentials. `Ok(None)` when no such email exists, so
    /// callers can produce a generic "incorrect email or password" without
    /// branching on error variants.
    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    /// Looks up login credentials for an existing session, for operations
    /// that re-verify the password (e.g. changing it).
    async fn get_credentials_by_id(&self, user_id: Uuid) -> PortResult<UserCredentials>;

    /// Overwrites topics, article count, and language in a single update.
    async fn update_preferences(&self, user_id: Uuid, prefs: &Preferences) -> PortResult<()>;

    /// Overwrites display name and password hash in a single update.
    async fn update_account(
        &self,
        user_id: Uuid,
        display_name: &str,
        password_hash: &str,
    ) -> PortResult<()>;

    /// Set-semantics add: inserting a url that is already present is a no-op.
    async fn add_favorite(&self, user_id: Uuid, favorite: &Favorite) -> PortResult<()>;

    /// No-op when the url is not in the list.
    async fn remove_favorite(&self, user_id: Uuid, url: &str) -> PortResult<()>;

    async fn count_users(&self) -> PortResult<u64>;

    /// Bulk-deletes every user, returning how many were removed.
    async fn delete_all_users(&self) -> PortResult<u64>;
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Fetches articles matching any of `topics` (logical OR). Zero provider
    /// results is `Ok(vec![])`, not an error. Individual malformed articles
    /// are skipped; only a failed request surfaces as `Upstream`.
    async fn fetch(
        &self,
        topics: &[String],
        language: &str,
        page_size: u32,
    ) -> PortResult<Vec<Article>>;
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Produces a short summary of an article. Content-insufficiency cases
    /// (body too short, paywalled) resolve to a fixed message without an
    /// upstream call. Upstream failures surface as `Err`; callers degrade to
    /// a fallback string rather than failing the request.
    async fn summarize(&self, title: &str, body: &str, language: &str) -> PortResult<String>;
}

/// Best-effort key/value cache. Both operations are infallible at the call
/// site: implementations log and swallow transport errors, and a miss or an
/// unavailable backend simply falls through to a live fetch.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn put(&self, key: &str, value: &str, ttl: Duration);
}
