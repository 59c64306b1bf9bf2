//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes. This is the single
//! dependency point every protected endpoint relies on: it resolves the
//! session cookie into a full `User` value, read-only and idempotent.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::error::RequestError;
use crate::web::state::AppState;

/// The cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "access_token";

/// Pulls the session token out of the request's Cookie header, if any.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_header.split(';').find_map(|c| {
        c.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('=')
    })
}

/// Middleware that resolves the session cookie into an authenticated user.
///
/// On success the full `User` is inserted into request extensions for
/// handlers to consume. Failures map onto the request taxonomy:
/// missing/invalid/expired credential is 401, a malformed subject id is 400,
/// and a vanished user is 404.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, RequestError> {
    // 1. Extract the session token from the cookie.
    let token = session_token(req.headers()).ok_or(RequestError::Unauthenticated)?;

    // 2. Decode and check signature + expiry.
    let claims = state
        .tokens
        .verify(token)
        .ok_or(RequestError::Unauthenticated)?;

    // 3. The subject claim must be a well-formed user id.
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| RequestError::BadRequest("invalid user id in session token".to_string()))?;

    // 4. Load the full user record.
    let user = state.store.get_user_by_id(user_id).await.map_err(|e| {
        debug!("session user lookup failed: {:?}", e);
        RequestError::from(e)
    })?;

    // 5. Hand the identity to the handler.
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn absent_cookie_yields_none() {
        assert_eq!(session_token(&HeaderMap::new()), None);
        let headers = headers_with_cookie("other=abc; theme=dark");
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn token_is_extracted_among_other_cookies() {
        let headers = headers_with_cookie("theme=dark; access_token=abc.def.ghi; lang=en");
        assert_eq!(session_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn prefix_named_cookies_do_not_match() {
        let headers = headers_with_cookie("access_token_old=zzz");
        assert_eq!(session_token(&headers), None);
    }
}
