//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user registration, login, and logout.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::RequestError;
use crate::password::{hash_password, verify_password};
use crate::web::middleware::SESSION_COOKIE;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub email: String,
}

fn session_cookie(token: &str, max_age_seconds: i64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, token, max_age_seconds
    )
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/register - Create a new user account and log it in
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Missing required fields"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, RequestError> {
    let email = req.email.trim().to_lowercase();
    let name = req.name.trim().to_string();

    // 1. Basic input validation.
    if name.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(RequestError::Validation("please fill all fields".to_string()));
    }

    // 2. Friendly duplicate check. The unique index on email still catches
    //    the race loser.
    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(RequestError::Conflict(
            "a user with this email already exists".to_string(),
        ));
    }

    // 3. Hash the password.
    let password_hash = hash_password(&req.password).map_err(|e| {
        error!("failed to hash password: {:?}", e);
        RequestError::Internal("failed to hash password".to_string())
    })?;

    // 4. Create the user.
    let user = state
        .store
        .create_user(&email, &name, &password_hash)
        .await?;

    // 5. Automatic login after successful registration.
    let token = state.tokens.issue(user.id).map_err(|e| {
        error!("failed to issue session token: {:?}", e);
        RequestError::Internal("failed to create session".to_string())
    })?;
    let cookie = session_cookie(&token, state.tokens.ttl().num_seconds());

    let response = AuthResponse {
        user_id: user.id,
        email: user.email,
    };
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(response),
    ))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, RequestError> {
    let email = req.email.trim().to_lowercase();

    // 1. Get credentials by email. Unknown email gets the same generic
    //    failure as a wrong password.
    let creds = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or(RequestError::InvalidCredentials)?;

    // 2. Verify password against the stored hash.
    if !verify_password(&req.password, &creds.password_hash) {
        return Err(RequestError::InvalidCredentials);
    }

    // 3. Issue a fresh session token.
    let token = state.tokens.issue(creds.user_id).map_err(|e| {
        error!("failed to issue session token: {:?}", e);
        RequestError::Internal("failed to create session".to_string())
    })?;
    let cookie = session_cookie(&token, state.tokens.ttl().num_seconds());

    let response = AuthResponse {
        user_id: creds.user_id,
        email: creds.email,
    };
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(response)))
}

/// POST /auth/logout - Clear the session cookie
///
/// Tokens are stateless, so logout is purely client-side: the cookie is
/// expired and the token simply ages out.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful")
    )
)]
pub async fn logout_handler() -> impl IntoResponse {
    let cookie = session_cookie("", 0);
    (StatusCode::OK, [(header::SET_COOKIE, cookie)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_http_only_and_same_site() {
        let cookie = session_cookie("abc.def.ghi", 3600);
        assert!(cookie.starts_with("access_token=abc.def.ghi;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=3600"));
    }

    #[test]
    fn logout_cookie_expires_immediately() {
        let cookie = session_cookie("", 0);
        assert!(cookie.contains("Max-Age=0"));
    }
}
