use axum::extract::State;
use axum::response::Response;
use uuid::Uuid;

use crate::media::{Accept, Negotiated};
use crate::middleware::authorize::{
    RequireCreateEntry, RequireDeleteEntry, RequireReadEntry, RequireUpdateEntry,
};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::{Path, Query};

use super::model::{CreateEntryDto, Entry, EntrySearchParams, UpdateEntryDto};
use super::service;

#[utoipa::path(
    post,
    path = "/v1/entry",
    request_body = CreateEntryDto,
    responses(
        (status = 201, description = "Entry created", body = Entry),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Entries",
    security(("bearer_auth" = []))
)]
pub async fn create_entry(
    State(state): State<AppState>,
    RequireCreateEntry(context): RequireCreateEntry,
    accept: Accept,
    Negotiated(dto): Negotiated<CreateEntryDto>,
) -> Result<Response, AppError> {
    // Entries always belong to a concrete user; a system token has no row to
    // own them.
    let user_id = context
        .user_id()
        .ok_or_else(|| AppError::invalid_request("entry creation requires a user context"))?;

    let entry = service::create_entry(&state.db, user_id, dto).await?;
    accept.created(&entry)
}

#[utoipa::path(
    get,
    path = "/v1/entry/{id}",
    params(("id" = Uuid, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "Entry details", body = Entry),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Entry not found")
    ),
    tag = "Entries",
    security(("bearer_auth" = []))
)]
pub async fn get_entry(
    State(state): State<AppState>,
    RequireReadEntry(context): RequireReadEntry,
    accept: Accept,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let entry = service::fetch_entry(&state.db, id, context.user_id()).await?;
    accept.ok(&entry)
}

#[utoipa::path(
    get,
    path = "/v1/entry",
    params(
        ("from" = Option<String>, Query, description = "Earliest date (inclusive)"),
        ("to" = Option<String>, Query, description = "Latest date (inclusive)"),
        ("userId" = Option<Uuid>, Query, description = "Owner filter (system callers only)")
    ),
    responses(
        (status = 200, description = "Matching entries", body = [Entry]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Entries",
    security(("bearer_auth" = []))
)]
pub async fn search_entries(
    State(state): State<AppState>,
    RequireReadEntry(context): RequireReadEntry,
    accept: Accept,
    Query(params): Query<EntrySearchParams>,
) -> Result<Response, AppError> {
    let entries = service::search_entries(&state.db, params, context.user_id()).await?;
    accept.ok(&entries)
}

#[utoipa::path(
    put,
    path = "/v1/entry/{id}",
    params(("id" = Uuid, Path, description = "Entry ID")),
    request_body = UpdateEntryDto,
    responses(
        (status = 200, description = "Entry updated", body = Entry),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Entry not found")
    ),
    tag = "Entries",
    security(("bearer_auth" = []))
)]
pub async fn update_entry(
    State(state): State<AppState>,
    RequireUpdateEntry(context): RequireUpdateEntry,
    accept: Accept,
    Path(id): Path<Uuid>,
    Negotiated(dto): Negotiated<UpdateEntryDto>,
) -> Result<Response, AppError> {
    let entry = service::update_entry(&state.db, id, dto, context.user_id()).await?;
    accept.ok(&entry)
}

#[utoipa::path(
    delete,
    path = "/v1/entry/{id}",
    params(("id" = Uuid, Path, description = "Entry ID")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Entry not found")
    ),
    tag = "Entries",
    security(("bearer_auth" = []))
)]
pub async fn delete_entry(
    State(state): State<AppState>,
    RequireDeleteEntry(context): RequireDeleteEntry,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AppError> {
    service::delete_entry(&state.db, id, context.user_id()).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
