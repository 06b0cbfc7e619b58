use axum::extract::State;
use axum::response::Response;
use tracing::warn;
use uuid::Uuid;

use crate::media::{Accept, Negotiated};
use crate::middleware::auth::AuthenticationContext;
use crate::middleware::authorize::{
    RequireDeleteUser, RequireReadUser, RequireUpdateRole, RequireUpdateUser,
};
use crate::state::AppState;
use crate::utils::email::EmailService;
use crate::utils::errors::AppError;
use crate::utils::extract::Path;

use super::model::{AssignRoleDto, CreateUserDto, UpdateUserDto, User};
use super::service;

/// Non-system callers may only touch their own record.
fn ensure_owner(context: &AuthenticationContext, id: Uuid) -> Result<(), AppError> {
    if context.is_system() || context.user_id() == Some(id) {
        Ok(())
    } else {
        Err(AppError::unauthorized(format!(
            "caller may not operate on user {id}"
        )))
    }
}

#[utoipa::path(
    post,
    path = "/v1/user",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User registered", body = User),
        (status = 400, description = "Invalid request"),
        (status = 415, description = "Unsupported payload")
    ),
    tag = "Users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    accept: Accept,
    Negotiated(dto): Negotiated<CreateUserDto>,
) -> Result<Response, AppError> {
    let user = service::create_user(&state.db, &state.transcoders, dto).await?;

    // Welcome mail is best-effort; registration never fails on SMTP trouble.
    let email_service = EmailService::new(state.email_config.clone());
    let (to_email, to_name) = (user.email.clone(), user.display_name.clone());
    tokio::spawn(async move {
        if let Err(e) = email_service.send_welcome_email(&to_email, &to_name).await {
            warn!(error = %e.detail, "Failed to send welcome email");
        }
    });

    accept.created(&user)
}

#[utoipa::path(
    get,
    path = "/v1/user/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = User),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    RequireReadUser(context): RequireReadUser,
    accept: Accept,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    ensure_owner(&context, id)?;
    let user = service::fetch_user(&state.db, &state.transcoders, id).await?;
    accept.ok(&user)
}

#[utoipa::path(
    put,
    path = "/v1/user/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    RequireUpdateUser(context): RequireUpdateUser,
    accept: Accept,
    Path(id): Path<Uuid>,
    Negotiated(dto): Negotiated<UpdateUserDto>,
) -> Result<Response, AppError> {
    ensure_owner(&context, id)?;
    let user = service::update_user(&state.db, &state.transcoders, id, dto).await?;
    accept.ok(&user)
}

#[utoipa::path(
    put,
    path = "/v1/user/{id}/role",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = AssignRoleDto,
    responses(
        (status = 200, description = "Role assigned", body = User),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn assign_role(
    State(state): State<AppState>,
    RequireUpdateRole(_context): RequireUpdateRole,
    accept: Accept,
    Path(id): Path<Uuid>,
    Negotiated(dto): Negotiated<AssignRoleDto>,
) -> Result<Response, AppError> {
    let user = service::assign_role(&state.db, &state.transcoders, id, dto.role_id).await?;
    accept.ok(&user)
}

#[utoipa::path(
    delete,
    path = "/v1/user/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    RequireDeleteUser(context): RequireDeleteUser,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AppError> {
    ensure_owner(&context, id)?;
    service::delete_user(&state.db, id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
