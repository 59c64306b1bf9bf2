//! crates/news_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A user's personalization settings. Defaults are applied at the read
/// boundary (the store adapter), so the rest of the app never sees a
/// partially-populated value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub topics: Vec<String>,
    pub article_count: u32,
    pub language: String,
}

impl Preferences {
    pub const DEFAULT_ARTICLE_COUNT: u32 = 10;
    pub const DEFAULT_LANGUAGE: &'static str = "en";
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            topics: Vec::new(),
            article_count: Self::DEFAULT_ARTICLE_COUNT,
            language: Self::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

// Represents a user - used throughout the app.
// The password hash is deliberately NOT part of this struct.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub preferences: Preferences,
    pub favorites: Vec<Favorite>,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login/registration - contains sensitive data.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub password_hash: String,
}

/// A news article as normalized from the provider. Ephemeral: fetched fresh
/// per request and never persisted except as a [`Favorite`] snapshot.
#[derive(Debug, Clone)]
pub struct Article {
    pub source: String,
    pub author: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub content: Option<String>,
}

/// A user-saved snapshot of an article. `published` keeps the provider's
/// original timestamp string. The url is the identity: one entry per url
/// within a user's list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Favorite {
    pub url: String,
    pub title: String,
    pub source: String,
    pub published: String,
}

/// An article paired with its (possibly fallback) AI summary.
#[derive(Debug, Clone)]
pub struct SummarizedArticle {
    pub article: Article,
    pub summary: String,
}
