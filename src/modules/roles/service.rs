use chrono::Utc;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::utils::errors::AppError;

use super::model::{CreateRoleDto, Permission, Role, RoleWithPermissions, UpdateRoleDto};

const PERMISSION_COLUMNS: &str = "id, name, description, created_at";
const ROLE_COLUMNS: &str = "id, name, created_at, updated_at";

#[instrument(skip(db))]
pub async fn list_permissions(db: &PgPool) -> Result<Vec<Permission>, AppError> {
    let permissions = sqlx::query_as::<_, Permission>(&format!(
        "SELECT {PERMISSION_COLUMNS} FROM permissions ORDER BY name"
    ))
    .fetch_all(db)
    .await?;

    Ok(permissions)
}

#[instrument(skip(db))]
async fn permissions_for_role(db: &PgPool, role_id: Uuid) -> Result<Vec<Permission>, AppError> {
    let permissions = sqlx::query_as::<_, Permission>(
        "SELECT p.id, p.name, p.description, p.created_at FROM permissions p \
         JOIN role_permissions rp ON rp.permission_id = p.id \
         WHERE rp.role_id = $1 ORDER BY p.name",
    )
    .bind(role_id)
    .fetch_all(db)
    .await?;

    Ok(permissions)
}

async fn replace_role_permissions(
    db: &PgPool,
    role_id: Uuid,
    permission_ids: &[Uuid],
) -> Result<(), AppError> {
    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
        .bind(role_id)
        .execute(&mut *tx)
        .await?;

    for permission_id in permission_ids {
        sqlx::query("INSERT INTO role_permissions (role_id, permission_id) VALUES ($1, $2)")
            .bind(role_id)
            .bind(permission_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                    AppError::invalid_request(format!("unknown permission {permission_id}"))
                }
                _ => AppError::from(e),
            })?;
    }

    tx.commit().await?;
    Ok(())
}

#[instrument(skip(db, dto))]
pub async fn create_role(db: &PgPool, dto: CreateRoleDto) -> Result<RoleWithPermissions, AppError> {
    let role = sqlx::query_as::<_, Role>(&format!(
        "INSERT INTO roles (id, name, created_at, updated_at) \
         VALUES ($1, $2, $3, $3) RETURNING {ROLE_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(&dto.name)
    .bind(Utc::now())
    .fetch_one(db)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::invalid_request("A role with this name already exists")
        }
        _ => AppError::from(e),
    })?;

    if let Some(permission_ids) = &dto.permission_ids {
        replace_role_permissions(db, role.id, permission_ids).await?;
    }

    let permissions = permissions_for_role(db, role.id).await?;
    Ok(RoleWithPermissions { role, permissions })
}

#[instrument(skip(db))]
pub async fn fetch_role(db: &PgPool, id: Uuid) -> Result<RoleWithPermissions, AppError> {
    let role = sqlx::query_as::<_, Role>(&format!(
        "SELECT {ROLE_COLUMNS} FROM roles WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found(format!("role {id}")))?;

    let permissions = permissions_for_role(db, role.id).await?;
    Ok(RoleWithPermissions { role, permissions })
}

#[instrument(skip(db))]
pub async fn list_roles(db: &PgPool) -> Result<Vec<RoleWithPermissions>, AppError> {
    let roles = sqlx::query_as::<_, Role>(&format!(
        "SELECT {ROLE_COLUMNS} FROM roles ORDER BY name"
    ))
    .fetch_all(db)
    .await?;

    let mut result = Vec::with_capacity(roles.len());
    for role in roles {
        let permissions = permissions_for_role(db, role.id).await?;
        result.push(RoleWithPermissions { role, permissions });
    }
    Ok(result)
}

#[instrument(skip(db, dto))]
pub async fn update_role(
    db: &PgPool,
    id: Uuid,
    dto: UpdateRoleDto,
) -> Result<RoleWithPermissions, AppError> {
    let existing = fetch_role(db, id).await?;
    let name = dto.name.unwrap_or(existing.role.name);

    let role = sqlx::query_as::<_, Role>(&format!(
        "UPDATE roles SET name = $2, updated_at = $3 WHERE id = $1 RETURNING {ROLE_COLUMNS}"
    ))
    .bind(id)
    .bind(&name)
    .bind(Utc::now())
    .fetch_one(db)
    .await?;

    if let Some(permission_ids) = &dto.permission_ids {
        replace_role_permissions(db, id, permission_ids).await?;
    }

    let permissions = permissions_for_role(db, id).await?;
    Ok(RoleWithPermissions { role, permissions })
}

#[instrument(skip(db))]
pub async fn delete_role(db: &PgPool, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM roles WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!("role {id}")));
    }
    Ok(())
}
