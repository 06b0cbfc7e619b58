use axum::extract::State;
use axum::response::Response;
use uuid::Uuid;

use crate::media::{Accept, Negotiated};
use crate::middleware::authorize::{
    RequireCreateGoal, RequireDeleteGoal, RequireReadGoal, RequireUpdateGoal,
};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::Path;

use super::model::{CreateGoalDto, Goal, UpdateGoalDto};
use super::service;

#[utoipa::path(
    post,
    path = "/v1/goal",
    request_body = CreateGoalDto,
    responses(
        (status = 201, description = "Goal created", body = Goal),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Goals",
    security(("bearer_auth" = []))
)]
pub async fn create_goal(
    State(state): State<AppState>,
    RequireCreateGoal(context): RequireCreateGoal,
    accept: Accept,
    Negotiated(dto): Negotiated<CreateGoalDto>,
) -> Result<Response, AppError> {
    let user_id = context
        .user_id()
        .ok_or_else(|| AppError::invalid_request("goal creation requires a user context"))?;

    let goal = service::create_goal(&state.db, user_id, dto).await?;
    accept.created(&goal)
}

#[utoipa::path(
    get,
    path = "/v1/goal/{id}",
    params(("id" = Uuid, Path, description = "Goal ID")),
    responses(
        (status = 200, description = "Goal details", body = Goal),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Goal not found")
    ),
    tag = "Goals",
    security(("bearer_auth" = []))
)]
pub async fn get_goal(
    State(state): State<AppState>,
    RequireReadGoal(context): RequireReadGoal,
    accept: Accept,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let goal = service::fetch_goal(&state.db, id, context.user_id()).await?;
    accept.ok(&goal)
}

#[utoipa::path(
    get,
    path = "/v1/goal",
    responses(
        (status = 200, description = "Caller's goals", body = [Goal]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Goals",
    security(("bearer_auth" = []))
)]
pub async fn list_goals(
    State(state): State<AppState>,
    RequireReadGoal(context): RequireReadGoal,
    accept: Accept,
) -> Result<Response, AppError> {
    let goals = service::list_goals(&state.db, context.user_id()).await?;
    accept.ok(&goals)
}

#[utoipa::path(
    put,
    path = "/v1/goal/{id}",
    params(("id" = Uuid, Path, description = "Goal ID")),
    request_body = UpdateGoalDto,
    responses(
        (status = 200, description = "Goal updated", body = Goal),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Goal not found")
    ),
    tag = "Goals",
    security(("bearer_auth" = []))
)]
pub async fn update_goal(
    State(state): State<AppState>,
    RequireUpdateGoal(context): RequireUpdateGoal,
    accept: Accept,
    Path(id): Path<Uuid>,
    Negotiated(dto): Negotiated<UpdateGoalDto>,
) -> Result<Response, AppError> {
    let goal = service::update_goal(&state.db, id, dto, context.user_id()).await?;
    accept.ok(&goal)
}

#[utoipa::path(
    delete,
    path = "/v1/goal/{id}",
    params(("id" = Uuid, Path, description = "Goal ID")),
    responses(
        (status = 204, description = "Goal deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Goal not found")
    ),
    tag = "Goals",
    security(("bearer_auth" = []))
)]
pub async fn delete_goal(
    State(state): State<AppState>,
    RequireDeleteGoal(context): RequireDeleteGoal,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AppError> {
    service::delete_goal(&state.db, id, context.user_id()).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
