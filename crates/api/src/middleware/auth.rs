//! Authentication middleware for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use stockwise_core::auth::{Capability, Role};
use stockwise_shared::{AppError, Claims, JwtError};

use crate::AppState;
use crate::error::ApiError;

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates JWT tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token using the JWT service
/// 3. Stores the claims in request extensions for handlers to access
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return ApiError::from(AppError::Unauthorized(
            "Authorization header with Bearer token is required".to_string(),
        ))
        .into_response();
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            let message = match e {
                JwtError::Expired => "Token has expired",
                _ => "Invalid or malformed token",
            };
            ApiError::from(AppError::Unauthorized(message.to_string())).into_response()
        }
    }
}

/// Extractor for the authenticated caller.
///
/// ```ignore
/// async fn handler(auth: AuthUser) -> ApiResult<Json<Sale>> {
///     auth.require(Capability::RecordSales)?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the user ID from the claims.
    #[must_use]
    pub fn user_id(&self) -> uuid::Uuid {
        self.0.user_id()
    }

    /// The caller's role. Unknown role names are rejected as unauthenticated.
    pub fn role(&self) -> Result<Role, ApiError> {
        Role::parse(&self.0.role).ok_or_else(|| {
            ApiError::from(AppError::Unauthorized(format!(
                "unknown role in token: {}",
                self.0.role
            )))
        })
    }

    /// Fails with 403 unless the caller's role grants `capability`.
    pub fn require(&self, capability: Capability) -> Result<Role, ApiError> {
        let role = self.role()?;
        if role.can(capability) {
            Ok(role)
        } else {
            tracing::debug!(
                user_id = %self.user_id(),
                role = %role,
                ?capability,
                "capability denied"
            );
            Err(AppError::Forbidden(format!(
                "{} role or higher required",
                capability.required_role()
            ))
            .into())
        }
    }

    /// Returns the inner claims.
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use rstest::rstest;
    use uuid::Uuid;

    fn user(role: &str) -> AuthUser {
        AuthUser(Claims::new(
            Uuid::new_v4(),
            role,
            Utc::now() + Duration::minutes(5),
        ))
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }

    #[rstest]
    #[case("viewer", Capability::Read, true)]
    #[case("viewer", Capability::RecordSales, false)]
    #[case("cashier", Capability::RecordSales, true)]
    #[case("cashier", Capability::ReverseSales, false)]
    #[case("manager", Capability::ManageStock, true)]
    #[case("manager", Capability::ManageUsers, false)]
    #[case("admin", Capability::ManageUsers, true)]
    fn test_require(#[case] role: &str, #[case] capability: Capability, #[case] allowed: bool) {
        assert_eq!(user(role).require(capability).is_ok(), allowed);
    }

    #[test]
    fn test_denied_is_forbidden() {
        let err = user("cashier")
            .require(Capability::ManageCatalog)
            .expect_err("cashier cannot manage catalog");
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_unknown_role_is_unauthorized() {
        let err = user("owner").role().expect_err("unknown role");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
