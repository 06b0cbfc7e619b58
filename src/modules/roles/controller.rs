use axum::extract::State;
use axum::response::Response;
use uuid::Uuid;

use crate::media::{Accept, Negotiated};
use crate::middleware::authorize::{
    RequireCreateRole, RequireDeleteRole, RequireReadRole, RequireUpdateRole,
};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::Path;

use super::model::{CreateRoleDto, Permission, RoleWithPermissions, UpdateRoleDto};
use super::service;

#[utoipa::path(
    get,
    path = "/v1/permission",
    responses(
        (status = 200, description = "All registered permissions", body = [Permission]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn list_permissions(
    State(state): State<AppState>,
    RequireReadRole(_context): RequireReadRole,
    accept: Accept,
) -> Result<Response, AppError> {
    let permissions = service::list_permissions(&state.db).await?;
    accept.ok(&permissions)
}

#[utoipa::path(
    post,
    path = "/v1/role",
    request_body = CreateRoleDto,
    responses(
        (status = 201, description = "Role created", body = RoleWithPermissions),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn create_role(
    State(state): State<AppState>,
    RequireCreateRole(_context): RequireCreateRole,
    accept: Accept,
    Negotiated(dto): Negotiated<CreateRoleDto>,
) -> Result<Response, AppError> {
    let role = service::create_role(&state.db, dto).await?;
    accept.created(&role)
}

#[utoipa::path(
    get,
    path = "/v1/role",
    responses(
        (status = 200, description = "All roles", body = [RoleWithPermissions]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn list_roles(
    State(state): State<AppState>,
    RequireReadRole(_context): RequireReadRole,
    accept: Accept,
) -> Result<Response, AppError> {
    let roles = service::list_roles(&state.db).await?;
    accept.ok(&roles)
}

#[utoipa::path(
    get,
    path = "/v1/role/{id}",
    params(("id" = Uuid, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role details", body = RoleWithPermissions),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role not found")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn get_role(
    State(state): State<AppState>,
    RequireReadRole(_context): RequireReadRole,
    accept: Accept,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let role = service::fetch_role(&state.db, id).await?;
    accept.ok(&role)
}

#[utoipa::path(
    put,
    path = "/v1/role/{id}",
    params(("id" = Uuid, Path, description = "Role ID")),
    request_body = UpdateRoleDto,
    responses(
        (status = 200, description = "Role updated", body = RoleWithPermissions),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role not found")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn update_role(
    State(state): State<AppState>,
    RequireUpdateRole(_context): RequireUpdateRole,
    accept: Accept,
    Path(id): Path<Uuid>,
    Negotiated(dto): Negotiated<UpdateRoleDto>,
) -> Result<Response, AppError> {
    let role = service::update_role(&state.db, id, dto).await?;
    accept.ok(&role)
}

#[utoipa::path(
    delete,
    path = "/v1/role/{id}",
    params(("id" = Uuid, Path, description = "Role ID")),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role not found")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn delete_role(
    State(state): State<AppState>,
    RequireDeleteRole(_context): RequireDeleteRole,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AppError> {
    service::delete_role(&state.db, id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
