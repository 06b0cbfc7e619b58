use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use walktrack::config::cors::CorsConfig;
use walktrack::config::email::EmailConfig;
use walktrack::config::jwt::JwtConfig;
use walktrack::middleware::authorize::LocalAuthorizer;
use walktrack::modules::users::model::CreateUserDto;
use walktrack::modules::users::service as users_service;
use walktrack::state::{build_transcoder_registry, AppState};

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration_test_secret".to_string(),
        access_token_expiry: 3600,
    }
}

pub fn test_state(pool: PgPool) -> AppState {
    let jwt_config = test_jwt_config();
    AppState {
        db: pool.clone(),
        jwt_config: jwt_config.clone(),
        email_config: EmailConfig {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@walktrack.dev".to_string(),
            from_name: "WalkTrack".to_string(),
        },
        cors_config: CorsConfig {
            allowed_origins: vec!["http://localhost:5000".to_string()],
        },
        transcoders: Arc::new(build_transcoder_registry().unwrap()),
        authorizer: Arc::new(LocalAuthorizer::new(pool, jwt_config)),
    }
}

pub fn generate_unique_email() -> String {
    format!("user-{}@walktrack.dev", Uuid::new_v4())
}

/// Creates a role linked to the named permissions (seeded by the initial
/// migration) and returns its id.
#[allow(dead_code)]
pub async fn create_role_with_permissions(pool: &PgPool, name: &str, permissions: &[&str]) -> Uuid {
    let role_id: Uuid = sqlx::query_scalar(
        "INSERT INTO roles (id, name, created_at, updated_at) \
         VALUES ($1, $2, NOW(), NOW()) RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .fetch_one(pool)
    .await
    .unwrap();

    let names: Vec<String> = permissions.iter().map(|p| p.to_string()).collect();
    sqlx::query(
        "INSERT INTO role_permissions (role_id, permission_id) \
         SELECT $1, id FROM permissions WHERE name = ANY($2)",
    )
    .bind(role_id)
    .bind(&names)
    .execute(pool)
    .await
    .unwrap();

    role_id
}

/// Creates a user through the ordinary registration path and optionally
/// assigns a role.
#[allow(dead_code)]
pub async fn create_test_user(pool: &PgPool, email: &str, role_id: Option<Uuid>) -> Uuid {
    let registry = build_transcoder_registry().unwrap();
    let user = users_service::create_user(
        pool,
        &registry,
        CreateUserDto {
            email: email.to_string(),
            display_name: "Test User".to_string(),
            password: "testpass123".to_string(),
        },
    )
    .await
    .unwrap();

    if role_id.is_some() {
        users_service::assign_role(pool, &registry, user.id, role_id)
            .await
            .unwrap();
    }

    user.id
}
