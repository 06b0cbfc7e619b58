use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// One recorded walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    /// Distance in kilometres.
    pub distance: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// DTOs

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryDto {
    pub date: NaiveDate,
    #[validate(range(min = 0.0, message = "Distance must not be negative"))]
    pub distance: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryDto {
    pub date: Option<NaiveDate>,
    #[validate(range(min = 0.0, message = "Distance must not be negative"))]
    pub distance: Option<f64>,
}

/// Search criteria. The user filter is fixed to the caller for user contexts;
/// only a system context may search across users.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntrySearchParams {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub user_id: Option<Uuid>,
}
