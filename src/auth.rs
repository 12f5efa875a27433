//! Gateway principal extraction.
//!
//! Session authentication lives in the API gateway; this service trusts the
//! `X-User-Id` header it installs on forwarded requests.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing X-User-Id header".to_string()))?;

        let user_id = Uuid::parse_str(raw)
            .map_err(|_| AppError::Unauthorized("Invalid X-User-Id header".to_string()))?;

        Ok(AuthUser(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<AuthUser, AppError> {
        let (mut parts, _) = request.into_parts();
        AuthUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn extracts_valid_user_id() {
        let user_id = Uuid::new_v4();
        let request = Request::builder()
            .header("X-User-Id", user_id.to_string())
            .body(())
            .unwrap();

        let AuthUser(extracted) = extract(request).await.unwrap();
        assert_eq!(extracted, user_id);
    }

    #[tokio::test]
    async fn rejects_missing_header() {
        let request = Request::builder().body(()).unwrap();
        let err = extract(request).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn rejects_malformed_uuid() {
        let request = Request::builder()
            .header("X-User-Id", "not-a-uuid")
            .body(())
            .unwrap();

        let err = extract(request).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
