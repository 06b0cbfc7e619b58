mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use common::{create_role_with_permissions, generate_unique_email, test_jwt_config, test_state};
use walktrack::router::init_router;
use walktrack::utils::jwt::create_system_token;

const CREATE_USER_TYPE: &str = "application/json; structure=WalkTrack.CreateUser; version=1";
const AUTHENTICATE_TYPE: &str =
    "application/json; structure=WalkTrack.AuthenticationRequest; version=1";
const ASSIGN_ROLE_TYPE: &str = "application/json; structure=WalkTrack.AssignRole; version=1";
const CREATE_ROLE_TYPE: &str = "application/json; structure=WalkTrack.CreateRole; version=1";

async fn json_response(
    app: axum::Router,
    request: Request<Body>,
) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[sqlx::test(migrations = "./migrations")]
async fn test_registration_login_and_self_read(pool: PgPool) {
    let app = init_router(test_state(pool.clone()));
    let email = generate_unique_email();

    // Registration is open and never echoes credential material.
    let (status, user) = json_response(
        app.clone(),
        Request::builder()
            .method("POST")
            .uri("/v1/user")
            .header(header::CONTENT_TYPE, CREATE_USER_TYPE)
            .body(Body::from(format!(
                r#"{{"email": "{email}", "displayName": "Walker One", "password": "walkfar123"}}"#
            )))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["email"], email);
    assert!(user.get("passwordHash").is_none());
    let user_id = user["id"].as_str().unwrap().to_string();

    // Grant a role so the permission check passes for self reads.
    let role_id = create_role_with_permissions(&pool, "reader", &["read-user"]).await;
    let system_token = create_system_token(&test_jwt_config()).unwrap();
    let (status, _) = json_response(
        app.clone(),
        Request::builder()
            .method("PUT")
            .uri(format!("/v1/user/{user_id}/role"))
            .header(header::AUTHORIZATION, format!("Bearer {system_token}"))
            .header(header::CONTENT_TYPE, ASSIGN_ROLE_TYPE)
            .body(Body::from(format!(r#"{{"roleId": "{role_id}"}}"#)))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Login picks up the assigned role.
    let (status, auth) = json_response(
        app.clone(),
        Request::builder()
            .method("POST")
            .uri("/v1/authenticate")
            .header(header::CONTENT_TYPE, AUTHENTICATE_TYPE)
            .body(Body::from(format!(
                r#"{{"username": "{email}", "password": "walkfar123"}}"#
            )))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = auth["token"].as_str().unwrap().to_string();

    let (status, fetched) = json_response(
        app.clone(),
        Request::builder()
            .uri(format!("/v1/user/{user_id}"))
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], user_id.as_str());
    assert_eq!(fetched["roleId"], role_id.to_string());

    // Reading someone else's record is rejected even with the permission.
    let (status, body) = json_response(
        app,
        Request::builder()
            .uri(format!("/v1/user/{}", uuid::Uuid::new_v4()))
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_bad_password_is_unauthorized(pool: PgPool) {
    let app = init_router(test_state(pool.clone()));
    let email = generate_unique_email();
    common::create_test_user(&pool, &email, None).await;

    let (status, body) = json_response(
        app,
        Request::builder()
            .method("POST")
            .uri("/v1/authenticate")
            .header(header::CONTENT_TYPE, AUTHENTICATE_TYPE)
            .body(Body::from(format!(
                r#"{{"username": "{email}", "password": "wrongpass"}}"#
            )))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        serde_json::json!({"statusCode": 401, "message": "Unauthorized"})
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_role_lifecycle_under_system_token(pool: PgPool) {
    let app = init_router(test_state(pool.clone()));
    let system_token = create_system_token(&test_jwt_config()).unwrap();

    let permission_id: uuid::Uuid =
        sqlx::query_scalar("SELECT id FROM permissions WHERE name = 'read-entry'")
            .fetch_one(&pool)
            .await
            .unwrap();

    let (status, role) = json_response(
        app.clone(),
        Request::builder()
            .method("POST")
            .uri("/v1/role")
            .header(header::AUTHORIZATION, format!("Bearer {system_token}"))
            .header(header::CONTENT_TYPE, CREATE_ROLE_TYPE)
            .body(Body::from(format!(
                r#"{{"name": "staff", "permissionIds": ["{permission_id}"]}}"#
            )))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(role["name"], "staff");
    assert_eq!(role["permissions"][0]["name"], "read-entry");
    let role_id = role["id"].as_str().unwrap().to_string();

    let (status, listed) = json_response(
        app.clone(),
        Request::builder()
            .uri("/v1/role")
            .header(header::AUTHORIZATION, format!("Bearer {system_token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["count"], 1);

    let (status, _) = json_response(
        app.clone(),
        Request::builder()
            .method("DELETE")
            .uri(format!("/v1/role/{role_id}"))
            .header(header::AUTHORIZATION, format!("Bearer {system_token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = json_response(
        app,
        Request::builder()
            .uri(format!("/v1/role/{role_id}"))
            .header(header::AUTHORIZATION, format!("Bearer {system_token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
