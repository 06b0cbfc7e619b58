use chrono::Utc;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::entries::service::OwnerScope;
use crate::utils::errors::AppError;

use super::model::{CreateGoalDto, Goal, UpdateGoalDto};

const GOAL_COLUMNS: &str = "id, user_id, name, start_date, end_date, distance, created_at, updated_at";

#[instrument(skip(db, dto))]
pub async fn create_goal(db: &PgPool, user_id: Uuid, dto: CreateGoalDto) -> Result<Goal, AppError> {
    if dto.end_date < dto.start_date {
        return Err(AppError::invalid_request("Goal ends before it starts"));
    }

    let goal = sqlx::query_as::<_, Goal>(&format!(
        "INSERT INTO goals (id, user_id, name, start_date, end_date, distance, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $7) RETURNING {GOAL_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&dto.name)
    .bind(dto.start_date)
    .bind(dto.end_date)
    .bind(dto.distance)
    .bind(Utc::now())
    .fetch_one(db)
    .await?;

    Ok(goal)
}

#[instrument(skip(db))]
pub async fn fetch_goal(db: &PgPool, id: Uuid, scope: OwnerScope) -> Result<Goal, AppError> {
    let mut sql = format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = $1");
    if scope.is_some() {
        sql.push_str(" AND user_id = $2");
    }

    let mut query = sqlx::query_as::<_, Goal>(&sql).bind(id);
    if let Some(user_id) = scope {
        query = query.bind(user_id);
    }

    query
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("goal {id}")))
}

#[instrument(skip(db))]
pub async fn list_goals(db: &PgPool, scope: OwnerScope) -> Result<Vec<Goal>, AppError> {
    let mut sql = format!("SELECT {GOAL_COLUMNS} FROM goals");
    if scope.is_some() {
        sql.push_str(" WHERE user_id = $1");
    }
    sql.push_str(" ORDER BY start_date DESC");

    let mut query = sqlx::query_as::<_, Goal>(&sql);
    if let Some(user_id) = scope {
        query = query.bind(user_id);
    }

    Ok(query.fetch_all(db).await?)
}

#[instrument(skip(db, dto))]
pub async fn update_goal(
    db: &PgPool,
    id: Uuid,
    dto: UpdateGoalDto,
    scope: OwnerScope,
) -> Result<Goal, AppError> {
    let existing = fetch_goal(db, id, scope).await?;

    let name = dto.name.unwrap_or(existing.name);
    let start_date = dto.start_date.unwrap_or(existing.start_date);
    let end_date = dto.end_date.unwrap_or(existing.end_date);
    let distance = dto.distance.unwrap_or(existing.distance);

    if end_date < start_date {
        return Err(AppError::invalid_request("Goal ends before it starts"));
    }

    let goal = sqlx::query_as::<_, Goal>(&format!(
        "UPDATE goals SET name = $2, start_date = $3, end_date = $4, distance = $5, updated_at = $6 \
         WHERE id = $1 RETURNING {GOAL_COLUMNS}"
    ))
    .bind(id)
    .bind(&name)
    .bind(start_date)
    .bind(end_date)
    .bind(distance)
    .bind(Utc::now())
    .fetch_one(db)
    .await?;

    Ok(goal)
}

#[instrument(skip(db))]
pub async fn delete_goal(db: &PgPool, id: Uuid, scope: OwnerScope) -> Result<(), AppError> {
    let mut sql = "DELETE FROM goals WHERE id = $1".to_string();
    if scope.is_some() {
        sql.push_str(" AND user_id = $2");
    }

    let result = match scope {
        Some(user_id) => sqlx::query(&sql).bind(id).bind(user_id).execute(db).await?,
        None => sqlx::query(&sql).bind(id).execute(db).await?,
    };

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!("goal {id}")));
    }
    Ok(())
}
