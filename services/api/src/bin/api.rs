//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{NewsApiAdapter, NoopCache, OpenAiSummaryAdapter, PgUserStore, RedisCache},
    config::Config,
    error::ApiError,
    token::TokenService,
    web::{
        auth::{login_handler, logout_handler, register_handler},
        middleware::require_auth,
        rest::{
            add_favorite_handler, clear_users_handler, dashboard_handler, edit_profile_handler,
            get_profile_handler, list_favorites_handler, me_handler, remove_favorite_handler,
            update_profile_handler, user_count_handler, ApiDoc,
        },
        state::AppState,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use news_core::ports::Cache;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(PgUserStore::new(db_pool.clone()));
    info!("Running database migrations...");
    store
        .run_migrations()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    // Cache is optional: no REDIS_URL means the no-op implementation, so the
    // fetch path never branches on whether caching is enabled.
    let cache: Arc<dyn Cache> = match &config.redis_url {
        Some(url) => {
            info!("Connecting to cache...");
            Arc::new(
                RedisCache::connect(url)
                    .await
                    .map_err(|e| ApiError::Internal(format!("cache connection failed: {}", e)))?,
            )
        }
        None => {
            info!("No REDIS_URL configured; response caching disabled.");
            Arc::new(NoopCache)
        }
    };

    let news = Arc::new(
        NewsApiAdapter::new(config.news_api_key.clone(), cache)
            .map_err(|e| ApiError::Internal(format!("http client setup failed: {}", e)))?,
    );

    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    let openai_client = Client::with_config(openai_config);
    let summarizer = Arc::new(OpenAiSummaryAdapter::new(
        openai_client,
        config.summary_model.clone(),
    ));

    let tokens = TokenService::new(&config.jwt_secret, config.session_ttl_minutes);

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        store,
        news,
        summarizer,
        tokens,
        config: config.clone(),
    });

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .cors_origin
                .parse::<HeaderValue>()
                .map_err(|e| ApiError::Internal(format!("invalid CORS_ORIGIN: {}", e)))?,
        )
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    // Public routes (no auth required). The admin utilities stay public to
    // match the development scripts they replace.
    let public_routes = Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/admin/clear-users", delete(clear_users_handler))
        .route("/admin/user-count", get(user_count_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/users/me", get(me_handler))
        .route("/profile", get(get_profile_handler).post(update_profile_handler))
        .route("/profile/edit", post(edit_profile_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/favorites", get(list_favorites_handler))
        .route("/favorites/add", post(add_favorite_handler))
        .route("/favorites/remove", post(remove_favorite_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
