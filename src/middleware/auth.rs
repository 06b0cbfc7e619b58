//! Per-request authentication context attachment.
//!
//! Runs once per inbound request, before any permission check. A bearer token
//! is parsed and validated; the resulting [`AuthenticationContext`] is stored
//! in request extensions. This stage is deliberately fail-open: a missing,
//! expired or invalid token attaches `None` and the pipeline continues, so
//! endpoints without a permission requirement stay reachable. The 401/403
//! decision happens later, in the authorization check.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;
use uuid::Uuid;

use crate::config::jwt::JwtConfig;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::{verify_token, TokenOutcome};

/// Per-request identity classification. Immutable once attached.
#[derive(Debug, Clone)]
pub enum AuthenticationContext {
    /// Admin-flagged token; bypasses permission checks.
    System { token: String },
    /// Ordinary caller identified by the token's `id` claim.
    User { user_id: Uuid, token: String },
    /// No token, or one that failed validation.
    None,
}

impl AuthenticationContext {
    pub fn token(&self) -> Option<&str> {
        match self {
            AuthenticationContext::System { token }
            | AuthenticationContext::User { token, .. } => Some(token),
            AuthenticationContext::None => None,
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            AuthenticationContext::User { user_id, .. } => Some(*user_id),
            AuthenticationContext::System { .. } | AuthenticationContext::None => None,
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, AuthenticationContext::System { .. })
    }

    pub fn is_attached(&self) -> bool {
        !matches!(self, AuthenticationContext::None)
    }
}

/// Builds the context for a request's headers. Single pass, no retries.
pub fn context_from_headers(headers: &HeaderMap, jwt_config: &JwtConfig) -> AuthenticationContext {
    let Some(raw) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    else {
        return AuthenticationContext::None;
    };

    // Token is the substring after the last space of "Bearer <token>".
    let token = raw.rsplit(' ').next().unwrap_or(raw).to_string();

    match verify_token(&token, jwt_config) {
        TokenOutcome::Valid(claims) if claims.is_admin() => {
            AuthenticationContext::System { token }
        }
        TokenOutcome::Valid(claims) => {
            // Tokens we issue always carry an id; one without it is a token
            // issuance bug and gets no context, same as a failed validation.
            match claims.id.as_deref().and_then(|id| Uuid::parse_str(id).ok()) {
                Some(user_id) => AuthenticationContext::User { user_id, token },
                None => AuthenticationContext::None,
            }
        }
        outcome @ (TokenOutcome::Expired | TokenOutcome::Invalid | TokenOutcome::Malformed) => {
            debug!(?outcome, "Bearer token rejected, continuing unauthenticated");
            AuthenticationContext::None
        }
    }
}

/// Axum middleware that attaches the context. Never short-circuits and never
/// produces a response of its own.
pub async fn attach_authentication_context(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let context = context_from_headers(req.headers(), &state.jwt_config);
    req.extensions_mut().insert(context);
    next.run(req).await
}

/// Extractor handing the attached context to handlers.
#[derive(Debug, Clone)]
pub struct AuthContext(pub AuthenticationContext);

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let context = parts
            .extensions
            .get::<AuthenticationContext>()
            .cloned()
            .unwrap_or(AuthenticationContext::None);
        Ok(AuthContext(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::jwt::{create_system_token, create_user_token};
    use axum::http::HeaderValue;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "middleware_test_secret".to_string(),
            access_token_expiry: 3600,
        }
    }

    fn headers_with_bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn test_no_header_attaches_none() {
        let context = context_from_headers(&HeaderMap::new(), &test_config());
        assert!(matches!(context, AuthenticationContext::None));
    }

    #[test]
    fn test_admin_token_attaches_system() {
        let config = test_config();
        let token = create_system_token(&config).unwrap();
        let context = context_from_headers(&headers_with_bearer(&token), &config);
        assert!(context.is_system());
        assert_eq!(context.token(), Some(token.as_str()));
    }

    #[test]
    fn test_user_token_attaches_user_with_id() {
        let config = test_config();
        let user_id = Uuid::new_v4();
        let token = create_user_token(user_id, Some(Uuid::new_v4()), &config).unwrap();
        let context = context_from_headers(&headers_with_bearer(&token), &config);
        assert_eq!(context.user_id(), Some(user_id));
    }

    #[test]
    fn test_bad_signature_attaches_none_without_panicking() {
        let config = test_config();
        let other = JwtConfig {
            secret: "some_other_secret".to_string(),
            access_token_expiry: 3600,
        };
        let token = create_user_token(Uuid::new_v4(), Some(Uuid::new_v4()), &other).unwrap();
        let context = context_from_headers(&headers_with_bearer(&token), &config);
        assert!(matches!(context, AuthenticationContext::None));
    }

    #[test]
    fn test_garbage_token_attaches_none() {
        let context =
            context_from_headers(&headers_with_bearer("not-a-jwt"), &test_config());
        assert!(matches!(context, AuthenticationContext::None));
    }

    #[test]
    fn test_token_is_substring_after_last_space() {
        let config = test_config();
        let token = create_system_token(&config).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer  {token}")).unwrap(),
        );
        let context = context_from_headers(&headers, &config);
        assert!(context.is_system());
    }
}
