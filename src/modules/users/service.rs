//! User persistence over the document store.
//!
//! Users live in a JSONB column keyed by id; the stored shape is the
//! `WalkTrack.SecureUser` persist structure, encoded and decoded through the
//! transcoder registry exactly like wire payloads are. The email column is a
//! plain unique index beside the document for lookup during authentication.

use chrono::Utc;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::media::{TranscoderRegistry, TranscoderRole, WalkTrackMediaType};
use crate::utils::errors::AppError;
use crate::utils::password::hash_password;

use super::model::{CreateUserDto, SecureUser, UpdateUserDto, User};

pub const SECURE_USER_MEDIA_TYPE: &str =
    "application/json; structure=WalkTrack.SecureUser; version=1";

fn persist_media_type() -> WalkTrackMediaType {
    SECURE_USER_MEDIA_TYPE
        .parse()
        .expect("persist media type literal is well-formed")
}

fn encode_doc(
    registry: &TranscoderRegistry,
    user: &SecureUser,
) -> Result<serde_json::Value, AppError> {
    let bytes = registry.encode(&persist_media_type(), user, TranscoderRole::Persist)?;
    serde_json::from_slice(&bytes).map_err(AppError::internal)
}

fn decode_doc(
    registry: &TranscoderRegistry,
    doc: serde_json::Value,
) -> Result<SecureUser, AppError> {
    let bytes = serde_json::to_vec(&doc).map_err(AppError::internal)?;
    registry.decode(&persist_media_type(), &bytes, TranscoderRole::Persist)
}

#[instrument(skip(db, registry, dto))]
pub async fn create_user(
    db: &PgPool,
    registry: &TranscoderRegistry,
    dto: CreateUserDto,
) -> Result<User, AppError> {
    let now = Utc::now();
    let user = SecureUser {
        id: Uuid::new_v4(),
        email: dto.email.to_lowercase(),
        display_name: dto.display_name,
        role_id: None,
        password_hash: hash_password(&dto.password)?,
        created_at: now,
        updated_at: now,
    };

    let doc = encode_doc(registry, &user)?;

    sqlx::query("INSERT INTO users (id, email, doc) VALUES ($1, $2, $3)")
        .bind(user.id)
        .bind(&user.email)
        .bind(&doc)
        .execute(db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::invalid_request("A user with this email already exists")
            }
            _ => AppError::from(e),
        })?;

    Ok(user.into())
}

#[instrument(skip(db, registry))]
pub async fn fetch_secure_user(
    db: &PgPool,
    registry: &TranscoderRegistry,
    id: Uuid,
) -> Result<SecureUser, AppError> {
    let doc: Option<(serde_json::Value,)> =
        sqlx::query_as("SELECT doc FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?;

    let (doc,) = doc.ok_or_else(|| AppError::not_found(format!("user {id}")))?;
    decode_doc(registry, doc)
}

#[instrument(skip(db, registry))]
pub async fn fetch_user(
    db: &PgPool,
    registry: &TranscoderRegistry,
    id: Uuid,
) -> Result<User, AppError> {
    fetch_secure_user(db, registry, id).await.map(User::from)
}

#[instrument(skip(db, registry, email))]
pub async fn find_by_email(
    db: &PgPool,
    registry: &TranscoderRegistry,
    email: &str,
) -> Result<Option<SecureUser>, AppError> {
    let doc: Option<(serde_json::Value,)> =
        sqlx::query_as("SELECT doc FROM users WHERE email = $1")
            .bind(email.to_lowercase())
            .fetch_optional(db)
            .await?;

    match doc {
        Some((doc,)) => Ok(Some(decode_doc(registry, doc)?)),
        None => Ok(None),
    }
}

#[instrument(skip(db, registry, dto))]
pub async fn update_user(
    db: &PgPool,
    registry: &TranscoderRegistry,
    id: Uuid,
    dto: UpdateUserDto,
) -> Result<User, AppError> {
    let mut user = fetch_secure_user(db, registry, id).await?;

    if let Some(display_name) = dto.display_name {
        user.display_name = display_name;
    }
    if let Some(password) = dto.password {
        user.password_hash = hash_password(&password)?;
    }
    user.updated_at = Utc::now();

    let doc = encode_doc(registry, &user)?;
    sqlx::query("UPDATE users SET doc = $2 WHERE id = $1")
        .bind(id)
        .bind(&doc)
        .execute(db)
        .await?;

    Ok(user.into())
}

/// Assigns a role to a user; used by role administration.
#[instrument(skip(db, registry))]
pub async fn assign_role(
    db: &PgPool,
    registry: &TranscoderRegistry,
    id: Uuid,
    role_id: Option<Uuid>,
) -> Result<User, AppError> {
    let mut user = fetch_secure_user(db, registry, id).await?;
    user.role_id = role_id;
    user.updated_at = Utc::now();

    let doc = encode_doc(registry, &user)?;
    sqlx::query("UPDATE users SET doc = $2 WHERE id = $1")
        .bind(id)
        .bind(&doc)
        .execute(db)
        .await?;

    Ok(user.into())
}

#[instrument(skip(db))]
pub async fn delete_user(db: &PgPool, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!("user {id}")));
    }
    Ok(())
}
