use axum::extract::State;
use axum::response::Response;
use tracing::info;

use crate::media::{Accept, Negotiated};
use crate::middleware::auth::{AuthContext, AuthenticationContext};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::{create_system_token, create_user_token};
use crate::utils::password::verify_password;

use super::model::{
    AuthenticateRequest, AuthenticationResponse, AuthorizeRequest, AuthorizeResponse,
};
use crate::modules::users::service as users_service;

#[utoipa::path(
    post,
    path = "/v1/authenticate",
    request_body = AuthenticateRequest,
    responses(
        (status = 200, description = "Token issued", body = AuthenticationResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Bad credentials")
    ),
    tag = "Auth"
)]
pub async fn authenticate(
    State(state): State<AppState>,
    accept: Accept,
    Negotiated(request): Negotiated<AuthenticateRequest>,
) -> Result<Response, AppError> {
    let user = users_service::find_by_email(&state.db, &state.transcoders, &request.username)
        .await?
        .ok_or_else(|| AppError::unauthorized("unknown user"))?;

    if !verify_password(&request.password, &user.password_hash)? {
        return Err(AppError::unauthorized("bad password"));
    }

    let token = create_user_token(user.id, user.role_id, &state.jwt_config)?;
    info!(user_id = %user.id, "User authenticated");

    accept.ok(&AuthenticationResponse { token })
}

#[utoipa::path(
    put,
    path = "/v1/token",
    responses(
        (status = 200, description = "Fresh token issued", body = AuthenticationResponse),
        (status = 401, description = "No valid bearer token")
    ),
    tag = "Auth",
    security(("bearer_auth" = []))
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    AuthContext(context): AuthContext,
    accept: Accept,
) -> Result<Response, AppError> {
    let token = match context {
        AuthenticationContext::System { .. } => create_system_token(&state.jwt_config)?,
        AuthenticationContext::User { user_id, .. } => {
            // Re-read the user so a role change since login lands in the new
            // token.
            let user =
                users_service::fetch_secure_user(&state.db, &state.transcoders, user_id).await?;
            create_user_token(user.id, user.role_id, &state.jwt_config)?
        }
        AuthenticationContext::None => {
            return Err(AppError::unauthorized("refresh requires a valid token"));
        }
    };

    accept.ok(&AuthenticationResponse { token })
}

#[utoipa::path(
    post,
    path = "/v1/authorize",
    request_body = AuthorizeRequest,
    responses(
        (status = 200, description = "Authorization decision", body = AuthorizeResponse),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Auth",
    security(("bearer_auth" = []))
)]
pub async fn authorize(
    State(state): State<AppState>,
    AuthContext(context): AuthContext,
    accept: Accept,
    Negotiated(request): Negotiated<AuthorizeRequest>,
) -> Result<Response, AppError> {
    // Peer services authenticate themselves before asking about a subject
    // token.
    if !context.is_attached() {
        return Err(AppError::forbidden("authorize requires authentication"));
    }

    let authorized = state
        .authorizer
        .authorize(&request.token, &request.permission)
        .await?;

    accept.ok(&AuthorizeResponse { authorized })
}
