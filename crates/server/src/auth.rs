use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::Utc;
use supabase_jwt::{Claims, JwksCache};

use crate::error::AppError;

/// Fixed identity handed out when no Supabase project is configured.
pub const MOCK_USER_ID: &str = "mock-user-id";

#[derive(Clone)]
pub enum Verifier {
    Supabase(Arc<JwksCache>),
    /// Any bearer token is accepted as [`MOCK_USER_ID`].
    Mock,
}

impl Verifier {
    pub fn supabase(jwks_url: &str) -> Self {
        Verifier::Supabase(Arc::new(JwksCache::new(jwks_url)))
    }

    pub fn is_mock(&self) -> bool {
        matches!(self, Verifier::Mock)
    }

    /// User id of the caller, rejecting anonymous requests.
    pub async fn require(&self, headers: &HeaderMap) -> Result<String, AppError> {
        self.viewer(headers).await?.ok_or(AppError::Unauthorized)
    }

    /// User id of the caller if an `Authorization` header was sent. A header
    /// carrying a bad token is still an error.
    pub async fn viewer(&self, headers: &HeaderMap) -> Result<Option<String>, AppError> {
        let Some(auth_header) = headers.get("Authorization") else {
            return Ok(None);
        };

        let token = auth_header
            .to_str()
            .ok()
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::BadRequest("no bearer".into()))?;

        match self {
            Verifier::Mock => Ok(Some(MOCK_USER_ID.to_string())),
            Verifier::Supabase(jwks_cache) => verify_jwt(jwks_cache, token).await.map(Some),
        }
    }
}

async fn verify_jwt(jwks_cache: &Arc<JwksCache>, token: &str) -> Result<String, AppError> {
    let claims = Claims::from_token(token, jwks_cache).await;

    match claims {
        Err(_) => Err(AppError::Unauthorized),
        Ok(claims) if is_expired(claims.exp as i64) => Err(AppError::Unauthorized),
        Ok(claims) => Ok(claims.sub),
    }
}

fn is_expired(exp: i64) -> bool {
    Utc::now().timestamp() > exp
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[tokio::test]
    async fn missing_header_is_anonymous() {
        assert!(matches!(Verifier::Mock.viewer(&HeaderMap::new()).await, Ok(None)));
        assert!(matches!(
            Verifier::Mock.require(&HeaderMap::new()).await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn mock_mode_accepts_any_bearer_token() {
        let user = Verifier::Mock.require(&headers("Bearer whatever")).await.unwrap();

        assert_eq!(user, MOCK_USER_ID);
    }

    #[tokio::test]
    async fn header_without_bearer_is_rejected() {
        assert!(matches!(
            Verifier::Mock.viewer(&headers("Basic abc")).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            Verifier::Mock.viewer(&headers("Bearer ")).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn expiry_compares_against_now() {
        assert!(is_expired(0));
        assert!(!is_expired(Utc::now().timestamp() + 60));
    }
}
