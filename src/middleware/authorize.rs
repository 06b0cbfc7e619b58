//! Permission-based authorization.
//!
//! Handlers declare their requirement with a permission extractor generated by
//! [`require_permission!`]. The decision is:
//!
//! | Requirement | Context  | Authorizer | Outcome          |
//! |-------------|----------|------------|------------------|
//! | none        | —        | —          | run handler      |
//! | declared    | none     | —          | 403 Forbidden    |
//! | declared    | attached | true       | run handler      |
//! | declared    | attached | false      | 401 Unauthorized |
//!
//! The [`Authorizer`] decides whether a token holds a named permission:
//! locally against the role-permission tables, or remotely by delegating to a
//! peer service's authorize endpoint.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use crate::config::jwt::JwtConfig;
use crate::middleware::auth::AuthenticationContext;
use crate::utils::errors::AppError;
use crate::utils::jwt::verify_token;

#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Whether `token` holds `permission`. Unverifiable tokens are a plain
    /// `false` (fail-closed), not an error.
    async fn authorize(&self, token: &str, permission: &str) -> Result<bool, AppError>;
}

/// Applies the decision table for one declared permission requirement.
pub async fn check_permission(
    context: &AuthenticationContext,
    authorizer: &dyn Authorizer,
    permission: &str,
) -> Result<(), AppError> {
    let Some(token) = context.token() else {
        return Err(AppError::forbidden(format!(
            "no authentication context for permission '{permission}'"
        )));
    };

    if authorizer.authorize(token, permission).await? {
        Ok(())
    } else {
        Err(AppError::unauthorized(format!(
            "caller lacks permission '{permission}'"
        )))
    }
}

/// Resolves permissions against the local role tables. Admin-flagged tokens
/// are always authorized. The role lookup and the membership check are two
/// independent reads; a concurrent delete between them can only make the
/// answer more restrictive.
pub struct LocalAuthorizer {
    db: PgPool,
    jwt_config: JwtConfig,
}

impl LocalAuthorizer {
    pub fn new(db: PgPool, jwt_config: JwtConfig) -> Self {
        Self { db, jwt_config }
    }
}

#[async_trait]
impl Authorizer for LocalAuthorizer {
    #[instrument(skip(self, token))]
    async fn authorize(&self, token: &str, permission: &str) -> Result<bool, AppError> {
        let Some(claims) = verify_token(token, &self.jwt_config).into_claims() else {
            return Ok(false);
        };

        if claims.is_admin() {
            return Ok(true);
        }

        let Some(role_id) = claims.role_id else {
            return Ok(false);
        };

        let held: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(
                SELECT 1
                FROM role_permissions rp
                JOIN permissions p ON p.id = rp.permission_id
                WHERE rp.role_id = $1 AND p.name = $2
            )"#,
        )
        .bind(role_id)
        .bind(permission)
        .fetch_one(&self.db)
        .await?;

        Ok(held)
    }
}

/// Generates a permission extractor in the style of
/// `RequireCreateEntry(auth_context)`: resolving it runs the decision table
/// before the handler body executes.
#[macro_export]
macro_rules! require_permission {
    ($name:ident, $permission:literal) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthenticationContext);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = $crate::utils::errors::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let $crate::middleware::auth::AuthContext(context) =
                    <$crate::middleware::auth::AuthContext as axum::extract::FromRequestParts<
                        $crate::state::AppState,
                    >>::from_request_parts(parts, state)
                    .await?;

                $crate::middleware::authorize::check_permission(
                    &context,
                    state.authorizer.as_ref(),
                    $permission,
                )
                .await?;

                Ok($name(context))
            }
        }
    };
}

// Permission extractors for the API surface.

// Entries
require_permission!(RequireCreateEntry, "create-entry");
require_permission!(RequireReadEntry, "read-entry");
require_permission!(RequireUpdateEntry, "update-entry");
require_permission!(RequireDeleteEntry, "delete-entry");

// Goals
require_permission!(RequireCreateGoal, "create-goal");
require_permission!(RequireReadGoal, "read-goal");
require_permission!(RequireUpdateGoal, "update-goal");
require_permission!(RequireDeleteGoal, "delete-goal");

// Users
require_permission!(RequireReadUser, "read-user");
require_permission!(RequireUpdateUser, "update-user");
require_permission!(RequireDeleteUser, "delete-user");

// Roles
require_permission!(RequireCreateRole, "create-role");
require_permission!(RequireReadRole, "read-role");
require_permission!(RequireUpdateRole, "update-role");
require_permission!(RequireDeleteRole, "delete-role");
