//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use axum::{extract::State, http::StatusCode, response::Json, Extension};
use chrono::{DateTime, Utc};
use news_core::domain::{Favorite, Preferences, SummarizedArticle, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::error::RequestError;
use crate::password::{hash_password, verify_password};
use crate::web::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::web::feed::{build_feed, FeedError};
use crate::web::state::AppState;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::register_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
        me_handler,
        get_profile_handler,
        update_profile_handler,
        edit_profile_handler,
        dashboard_handler,
        list_favorites_handler,
        add_favorite_handler,
        remove_favorite_handler,
        clear_users_handler,
        user_count_handler,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            MeResponse,
            ProfileResponse,
            UpdateProfileRequest,
            EditProfileRequest,
            DashboardResponse,
            ArticleBody,
            FavoritesResponse,
            FavoriteBody,
            AddFavoriteRequest,
            RemoveFavoriteRequest,
            ClearUsersResponse,
            UserCountResponse,
        )
    ),
    tags(
        (name = "AI News Digest API", description = "Personalized, AI-summarized news feeds.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The current user, sanitized: no password hash leaves the store layer.
#[derive(Serialize, ToSchema)]
pub struct MeResponse {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    pub topics: Vec<String>,
    pub article_count: u32,
    pub language: String,
}

impl ProfileResponse {
    fn from_preferences(prefs: &Preferences) -> Self {
        Self {
            topics: prefs.topics.clone(),
            article_count: prefs.article_count,
            language: prefs.language.clone(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub topics: Vec<String>,
    pub article_count: u32,
}

#[derive(Deserialize, ToSchema)]
pub struct EditProfileRequest {
    pub name: String,
    pub current_password: String,
    pub new_password: String,
}

#[derive(Serialize, ToSchema)]
pub struct ArticleBody {
    pub title: String,
    pub source: String,
    pub url: String,
    pub image_url: Option<String>,
    pub published: DateTime<Utc>,
    pub summary: String,
}

impl ArticleBody {
    fn from_summarized(item: SummarizedArticle) -> Self {
        Self {
            title: item.article.title,
            source: item.article.source,
            url: item.article.url,
            image_url: item.article.image_url,
            published: item.article.published_at,
            summary: item.summary,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct DashboardResponse {
    pub total: usize,
    pub favorites_count: usize,
    pub articles: Vec<ArticleBody>,
}

#[derive(Serialize, ToSchema)]
pub struct FavoriteBody {
    pub url: String,
    pub title: String,
    pub source: String,
    pub published: String,
}

#[derive(Serialize, ToSchema)]
pub struct FavoritesResponse {
    pub total: usize,
    pub favorites: Vec<FavoriteBody>,
}

#[derive(Deserialize, ToSchema)]
pub struct AddFavoriteRequest {
    pub url: String,
    pub title: String,
    pub source: String,
    pub published: String,
}

#[derive(Deserialize, ToSchema)]
pub struct RemoveFavoriteRequest {
    pub url: String,
}

#[derive(Serialize, ToSchema)]
pub struct ClearUsersResponse {
    pub deleted_count: u64,
}

#[derive(Serialize, ToSchema)]
pub struct UserCountResponse {
    pub user_count: u64,
}

//=========================================================================================
// Profile & User Handlers
//=========================================================================================

/// GET /users/me - The authenticated user's account details
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me_handler(Extension(user): Extension<User>) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: user.id,
        email: user.email,
        name: user.display_name,
        created_at: user.created_at,
    })
}

/// GET /profile - Current topic preferences, with defaults when unset
#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Current preferences", body = ProfileResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_profile_handler(Extension(user): Extension<User>) -> Json<ProfileResponse> {
    Json(ProfileResponse::from_preferences(&user.preferences))
}

/// POST /profile - Save topic preferences and article count together
#[utoipa::path(
    post,
    path = "/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Preferences saved", body = ProfileResponse),
        (status = 400, description = "No topics selected"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, RequestError> {
    if req.topics.is_empty() {
        return Err(RequestError::Validation(
            "please select at least one topic".to_string(),
        ));
    }

    // Language is pinned to English when saving; stored legacy values still
    // read back as-is.
    let prefs = Preferences {
        topics: req.topics,
        article_count: req.article_count,
        language: Preferences::DEFAULT_LANGUAGE.to_string(),
    };
    state.store.update_preferences(user.id, &prefs).await?;

    Ok(Json(ProfileResponse::from_preferences(&prefs)))
}

/// POST /profile/edit - Change display name and password
///
/// The caller is already authenticated, but the stored password must still be
/// re-verified before the new one replaces it.
#[utoipa::path(
    post,
    path = "/profile/edit",
    request_body = EditProfileRequest,
    responses(
        (status = 200, description = "Account updated", body = MeResponse),
        (status = 400, description = "Missing field or wrong current password"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn edit_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<EditProfileRequest>,
) -> Result<Json<MeResponse>, RequestError> {
    let name = req.name.trim().to_string();
    if name.is_empty() || req.current_password.is_empty() || req.new_password.is_empty() {
        return Err(RequestError::Validation(
            "please fill in all fields".to_string(),
        ));
    }

    let credentials = state.store.get_credentials_by_id(user.id).await?;
    if !verify_password(&req.current_password, &credentials.password_hash) {
        return Err(RequestError::Validation(
            "current password is incorrect".to_string(),
        ));
    }

    let password_hash = hash_password(&req.new_password)
        .map_err(|e| RequestError::Internal(format!("password hashing failed: {}", e)))?;
    state
        .store
        .update_account(user.id, &name, &password_hash)
        .await?;

    Ok(Json(MeResponse {
        user_id: user.id,
        email: user.email,
        name,
        created_at: user.created_at,
    }))
}

//=========================================================================================
// Dashboard Handler
//=========================================================================================

/// GET /dashboard - The personalized, summarized feed
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Composed article and summary feed", body = DashboardResponse),
        (status = 400, description = "No topics selected yet"),
        (status = 401, description = "Not authenticated"),
        (status = 502, description = "News provider failure")
    )
)]
pub async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<DashboardResponse>, RequestError> {
    let feed = build_feed(state.news.as_ref(), state.summarizer.as_ref(), &user)
        .await
        .map_err(|e| match e {
            FeedError::NeedsPreferences => RequestError::Validation(
                "select your topics in the profile before opening the dashboard".to_string(),
            ),
            FeedError::Port(port) => {
                error!("dashboard feed failed: {}", port);
                RequestError::from(port)
            }
        })?;

    let articles: Vec<ArticleBody> = feed
        .articles
        .into_iter()
        .map(ArticleBody::from_summarized)
        .collect();

    Ok(Json(DashboardResponse {
        total: articles.len(),
        favorites_count: feed.favorites_count,
        articles,
    }))
}

//=========================================================================================
// Favorites Handlers
//=========================================================================================

/// GET /favorites - The user's saved articles
#[utoipa::path(
    get,
    path = "/favorites",
    responses(
        (status = 200, description = "Saved articles", body = FavoritesResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_favorites_handler(Extension(user): Extension<User>) -> Json<FavoritesResponse> {
    let favorites: Vec<FavoriteBody> = user
        .favorites
        .into_iter()
        .map(|f| FavoriteBody {
            url: f.url,
            title: f.title,
            source: f.source,
            published: f.published,
        })
        .collect();
    Json(FavoritesResponse {
        total: favorites.len(),
        favorites,
    })
}

/// POST /favorites/add - Save an article snapshot (idempotent by url)
#[utoipa::path(
    post,
    path = "/favorites/add",
    request_body = AddFavoriteRequest,
    responses(
        (status = 204, description = "Saved (or already present)"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn add_favorite_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<AddFavoriteRequest>,
) -> Result<StatusCode, RequestError> {
    let favorite = Favorite {
        url: req.url,
        title: req.title,
        source: req.source,
        published: req.published,
    };
    state.store.add_favorite(user.id, &favorite).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /favorites/remove - Drop a saved article (no-op when absent)
#[utoipa::path(
    post,
    path = "/favorites/remove",
    request_body = RemoveFavoriteRequest,
    responses(
        (status = 204, description = "Removed (or was absent)"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn remove_favorite_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<RemoveFavoriteRequest>,
) -> Result<StatusCode, RequestError> {
    state.store.remove_favorite(user.id, &req.url).await?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Admin Handlers
//=========================================================================================

/// DELETE /admin/clear-users - Bulk-delete every user
///
/// Development/testing utility, mirroring the admin script it replaces.
/// Deliberately unauthenticated; do not expose outside dev deployments.
#[utoipa::path(
    delete,
    path = "/admin/clear-users",
    responses(
        (status = 200, description = "All users deleted", body = ClearUsersResponse)
    )
)]
pub async fn clear_users_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClearUsersResponse>, RequestError> {
    let deleted_count = state.store.delete_all_users().await?;
    info!("admin clear-users removed {} users", deleted_count);
    Ok(Json(ClearUsersResponse { deleted_count }))
}

/// GET /admin/user-count - Current number of registered users
#[utoipa::path(
    get,
    path = "/admin/user-count",
    responses(
        (status = 200, description = "User count", body = UserCountResponse)
    )
)]
pub async fn user_count_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserCountResponse>, RequestError> {
    let user_count = state.store.count_users().await?;
    Ok(Json(UserCountResponse { user_count }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::token::TokenService;
    use async_trait::async_trait;
    use news_core::domain::{Article, UserCredentials};
    use news_core::ports::{NewsProvider, PortError, PortResult, Summarizer, UserStore};
    use std::sync::Mutex;
    use tracing::Level;

    /// A store holding one user's credentials and recording account updates.
    struct AccountStore {
        password_hash: String,
        updated: Mutex<Option<(String, String)>>,
    }

    #[async_trait]
    impl UserStore for AccountStore {
        async fn create_user(&self, _: &str, _: &str, _: &str) -> PortResult<User> {
            Err(PortError::Unexpected("not used".to_string()))
        }

        async fn find_user_by_email(&self, _: &str) -> PortResult<Option<UserCredentials>> {
            Err(PortError::Unexpected("not used".to_string()))
        }

        async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
            Err(PortError::NotFound(format!("User {} not found", user_id)))
        }

        async fn get_credentials_by_id(&self, user_id: Uuid) -> PortResult<UserCredentials> {
            Ok(UserCredentials {
                user_id,
                email: "jane@x.com".to_string(),
                password_hash: self.password_hash.clone(),
            })
        }

        async fn update_preferences(&self, _: Uuid, _: &Preferences) -> PortResult<()> {
            Err(PortError::Unexpected("not used".to_string()))
        }

        async fn update_account(
            &self,
            _: Uuid,
            display_name: &str,
            password_hash: &str,
        ) -> PortResult<()> {
            *self.updated.lock().unwrap() =
                Some((display_name.to_string(), password_hash.to_string()));
            Ok(())
        }

        async fn add_favorite(&self, _: Uuid, _: &Favorite) -> PortResult<()> {
            Err(PortError::Unexpected("not used".to_string()))
        }

        async fn remove_favorite(&self, _: Uuid, _: &str) -> PortResult<()> {
            Err(PortError::Unexpected("not used".to_string()))
        }

        async fn count_users(&self) -> PortResult<u64> {
            Ok(0)
        }

        async fn delete_all_users(&self) -> PortResult<u64> {
            Ok(0)
        }
    }

    struct NoNews;

    #[async_trait]
    impl NewsProvider for NoNews {
        async fn fetch(&self, _: &[String], _: &str, _: u32) -> PortResult<Vec<Article>> {
            Ok(vec![])
        }
    }

    struct NoSummaries;

    #[async_trait]
    impl Summarizer for NoSummaries {
        async fn summarize(&self, _: &str, _: &str, _: &str) -> PortResult<String> {
            Err(PortError::Upstream("not used".to_string()))
        }
    }

    fn state_with(store: Arc<AccountStore>) -> Arc<AppState> {
        let config = Config {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            database_url: String::new(),
            log_level: Level::INFO,
            news_api_key: String::new(),
            openai_api_key: None,
            jwt_secret: "test-secret".to_string(),
            redis_url: None,
            summary_model: String::new(),
            session_ttl_minutes: 60,
            cors_origin: String::new(),
        };
        Arc::new(AppState {
            store,
            news: Arc::new(NoNews),
            summarizer: Arc::new(NoSummaries),
            tokens: TokenService::new("test-secret", 60),
            config: Arc::new(config),
        })
    }

    fn account_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "jane@x.com".to_string(),
            display_name: "Jane".to_string(),
            preferences: Preferences::default(),
            favorites: vec![],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn profile_edit_rejects_a_wrong_current_password() {
        let store = Arc::new(AccountStore {
            password_hash: hash_password("old-password").unwrap(),
            updated: Mutex::new(None),
        });
        let result = edit_profile_handler(
            State(state_with(store.clone())),
            Extension(account_user()),
            Json(EditProfileRequest {
                name: "Jane Q".to_string(),
                current_password: "not-the-password".to_string(),
                new_password: "brand-new".to_string(),
            }),
        )
        .await;

        assert!(matches!(result, Err(RequestError::Validation(_))));
        assert!(store.updated.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn profile_edit_rehashes_and_stores_the_new_password() {
        let store = Arc::new(AccountStore {
            password_hash: hash_password("old-password").unwrap(),
            updated: Mutex::new(None),
        });
        let response = edit_profile_handler(
            State(state_with(store.clone())),
            Extension(account_user()),
            Json(EditProfileRequest {
                name: "  Jane Q  ".to_string(),
                current_password: "old-password".to_string(),
                new_password: "brand-new".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.0.name, "Jane Q");
        let updated = store.updated.lock().unwrap().clone().unwrap();
        assert_eq!(updated.0, "Jane Q");
        assert!(verify_password("brand-new", &updated.1));
        assert!(!verify_password("old-password", &updated.1));
    }

    #[tokio::test]
    async fn profile_edit_requires_every_field() {
        let store = Arc::new(AccountStore {
            password_hash: hash_password("old-password").unwrap(),
            updated: Mutex::new(None),
        });
        let result = edit_profile_handler(
            State(state_with(store.clone())),
            Extension(account_user()),
            Json(EditProfileRequest {
                name: "   ".to_string(),
                current_password: "old-password".to_string(),
                new_password: "brand-new".to_string(),
            }),
        )
        .await;

        assert!(matches!(result, Err(RequestError::Validation(_))));
        assert!(store.updated.lock().unwrap().is_none());
    }
}
