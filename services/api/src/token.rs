//! services/api/src/token.rs
//!
//! Stateless session tokens: HS256-signed JWTs carrying the user id and an
//! absolute expiry. There is no server-side revocation list; a token is
//! valid until it expires.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_TTL_MINUTES: i64 = 60;

/// Claims embedded in every session token issued by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Standard JWT subject — the user's id.
    pub sub: String,
    /// Standard JWT expiry (Unix timestamp, seconds).
    pub exp: i64,
}

/// Issues and verifies session tokens with a symmetric secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    /// The configured token lifetime, for sizing the cookie's Max-Age.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `user_id` expiring `ttl` from now.
    pub fn issue(&self, user_id: Uuid) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_with_ttl(user_id, self.ttl)
    }

    pub fn issue_with_ttl(
        &self,
        user_id: Uuid,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    /// Decodes and checks signature and expiry. Returns `None` on any
    /// failure; callers treat `None` as "unauthenticated".
    pub fn verify(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("a-test-secret-that-is-long-enough", DEFAULT_TTL_MINUTES)
    }

    #[test]
    fn issued_token_verifies_immediately() {
        let svc = service();
        let user_id = Uuid::new_v4();
        let token = svc.issue(user_id).unwrap();
        let claims = svc.verify(&token).expect("fresh token should verify");
        assert_eq!(claims.sub, user_id.to_string());
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = service();
        let token = svc
            .issue_with_ttl(Uuid::new_v4(), Duration::minutes(-5))
            .unwrap();
        assert!(svc.verify(&token).is_none());
    }

    #[test]
    fn token_signed_with_a_different_secret_is_rejected() {
        let issuer = TokenService::new("first-secret-first-secret-123456", 60);
        let verifier = TokenService::new("other-secret-other-secret-12345", 60);
        let token = issuer.issue(Uuid::new_v4()).unwrap();
        assert!(verifier.verify(&token).is_none());
    }

    #[test]
    fn garbage_tokens_are_rejected_not_panicked_on() {
        let svc = service();
        assert!(svc.verify("").is_none());
        assert!(svc.verify("not.a.jwt").is_none());
        assert!(svc.verify("aaaa.bbbb.cccc").is_none());
    }
}
