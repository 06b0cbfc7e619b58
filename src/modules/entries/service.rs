use chrono::Utc;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres};
use tracing::instrument;
use uuid::Uuid;

use crate::utils::errors::AppError;

use super::model::{CreateEntryDto, Entry, EntrySearchParams, UpdateEntryDto};

/// Row scope for reads and writes: `Some(user_id)` restricts to that owner,
/// `None` (system context) sees every row.
pub type OwnerScope = Option<Uuid>;

const ENTRY_COLUMNS: &str = "id, user_id, date, distance, created_at, updated_at";

fn scoped<'q>(
    query: QueryAs<'q, Postgres, Entry, PgArguments>,
    scope: &OwnerScope,
) -> QueryAs<'q, Postgres, Entry, PgArguments> {
    match scope {
        Some(user_id) => query.bind(*user_id),
        None => query,
    }
}

#[instrument(skip(db, dto))]
pub async fn create_entry(
    db: &PgPool,
    user_id: Uuid,
    dto: CreateEntryDto,
) -> Result<Entry, AppError> {
    let now = Utc::now();
    let entry = sqlx::query_as::<_, Entry>(&format!(
        "INSERT INTO entries (id, user_id, date, distance, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $5) RETURNING {ENTRY_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(dto.date)
    .bind(dto.distance)
    .bind(now)
    .fetch_one(db)
    .await?;

    Ok(entry)
}

#[instrument(skip(db))]
pub async fn fetch_entry(db: &PgPool, id: Uuid, scope: OwnerScope) -> Result<Entry, AppError> {
    let mut sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = $1");
    if scope.is_some() {
        sql.push_str(" AND user_id = $2");
    }

    scoped(sqlx::query_as::<_, Entry>(&sql).bind(id), &scope)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("entry {id}")))
}

#[instrument(skip(db, params))]
pub async fn search_entries(
    db: &PgPool,
    params: EntrySearchParams,
    scope: OwnerScope,
) -> Result<Vec<Entry>, AppError> {
    // System callers may narrow by an explicit user id; user callers are
    // pinned to their own rows regardless of what they ask for.
    let user_filter = scope.or(params.user_id);

    let mut sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE 1=1");
    let mut position = 0;

    if user_filter.is_some() {
        position += 1;
        sql.push_str(&format!(" AND user_id = ${position}"));
    }
    if params.from.is_some() {
        position += 1;
        sql.push_str(&format!(" AND date >= ${position}"));
    }
    if params.to.is_some() {
        position += 1;
        sql.push_str(&format!(" AND date <= ${position}"));
    }
    sql.push_str(" ORDER BY date DESC, created_at DESC");

    let mut query = sqlx::query_as::<_, Entry>(&sql);
    if let Some(user_id) = user_filter {
        query = query.bind(user_id);
    }
    if let Some(from) = params.from {
        query = query.bind(from);
    }
    if let Some(to) = params.to {
        query = query.bind(to);
    }

    Ok(query.fetch_all(db).await?)
}

#[instrument(skip(db, dto))]
pub async fn update_entry(
    db: &PgPool,
    id: Uuid,
    dto: UpdateEntryDto,
    scope: OwnerScope,
) -> Result<Entry, AppError> {
    let existing = fetch_entry(db, id, scope).await?;

    let date = dto.date.unwrap_or(existing.date);
    let distance = dto.distance.unwrap_or(existing.distance);

    let entry = sqlx::query_as::<_, Entry>(&format!(
        "UPDATE entries SET date = $2, distance = $3, updated_at = $4 \
         WHERE id = $1 RETURNING {ENTRY_COLUMNS}"
    ))
    .bind(id)
    .bind(date)
    .bind(distance)
    .bind(Utc::now())
    .fetch_one(db)
    .await?;

    Ok(entry)
}

#[instrument(skip(db))]
pub async fn delete_entry(db: &PgPool, id: Uuid, scope: OwnerScope) -> Result<(), AppError> {
    let mut sql = "DELETE FROM entries WHERE id = $1".to_string();
    if scope.is_some() {
        sql.push_str(" AND user_id = $2");
    }

    let result = match scope {
        Some(user_id) => sqlx::query(&sql).bind(id).bind(user_id).execute(db).await?,
        None => sqlx::query(&sql).bind(id).execute(db).await?,
    };

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!("entry {id}")));
    }
    Ok(())
}
