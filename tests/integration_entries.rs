mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use common::{create_role_with_permissions, create_test_user, generate_unique_email, test_jwt_config, test_state};
use walktrack::router::init_router;
use walktrack::utils::jwt::{create_system_token, create_user_token};

const CREATE_ENTRY_TYPE: &str = "application/json; structure=WalkTrack.CreateEntry; version=1";
const UPDATE_ENTRY_TYPE: &str = "application/json; structure=WalkTrack.UpdateEntry; version=1";

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
async fn test_create_then_fetch_entry_scoped_to_owner(pool: PgPool) {
    let config = test_jwt_config();
    let role_id = create_role_with_permissions(
        &pool,
        "walker",
        &["create-entry", "read-entry"],
    )
    .await;

    let owner = create_test_user(&pool, &generate_unique_email(), Some(role_id)).await;
    let other = create_test_user(&pool, &generate_unique_email(), Some(role_id)).await;

    let owner_token = create_user_token(owner, Some(role_id), &config).unwrap();
    let other_token = create_user_token(other, Some(role_id), &config).unwrap();

    let app = init_router(test_state(pool.clone()));

    let (status, created) = json_response(
        app.clone(),
        Request::builder()
            .method("POST")
            .uri("/v1/entry")
            .header(header::AUTHORIZATION, format!("Bearer {owner_token}"))
            .header(header::CONTENT_TYPE, CREATE_ENTRY_TYPE)
            .body(Body::from(r#"{"date": "2024-01-01", "distance": 3.5}"#))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["userId"], owner.to_string());
    assert_eq!(created["distance"], 3.5);
    let entry_id = created["id"].as_str().unwrap().to_string();

    // The owner reads back the identical record.
    let (status, fetched) = json_response(
        app.clone(),
        Request::builder()
            .uri(format!("/v1/entry/{entry_id}"))
            .header(header::AUTHORIZATION, format!("Bearer {owner_token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    // Another user's search never sees the owner's rows.
    let (status, search) = json_response(
        app.clone(),
        Request::builder()
            .uri("/v1/entry")
            .header(header::AUTHORIZATION, format!("Bearer {other_token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(search["count"], 0);

    // A system caller searches across users.
    let system_token = create_system_token(&config).unwrap();
    let (status, search) = json_response(
        app,
        Request::builder()
            .uri(format!("/v1/entry?userId={owner}"))
            .header(header::AUTHORIZATION, format!("Bearer {system_token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(search["count"], 1);
    assert_eq!(search["data"][0]["id"], entry_id.as_str());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_updating_a_foreign_entry_is_not_found(pool: PgPool) {
    let config = test_jwt_config();
    let role_id = create_role_with_permissions(
        &pool,
        "walker",
        &["create-entry", "update-entry"],
    )
    .await;

    let owner = create_test_user(&pool, &generate_unique_email(), Some(role_id)).await;
    let other = create_test_user(&pool, &generate_unique_email(), Some(role_id)).await;
    let owner_token = create_user_token(owner, Some(role_id), &config).unwrap();
    let other_token = create_user_token(other, Some(role_id), &config).unwrap();

    let app = init_router(test_state(pool.clone()));

    let (status, created) = json_response(
        app.clone(),
        Request::builder()
            .method("POST")
            .uri("/v1/entry")
            .header(header::AUTHORIZATION, format!("Bearer {owner_token}"))
            .header(header::CONTENT_TYPE, CREATE_ENTRY_TYPE)
            .body(Body::from(r#"{"date": "2024-02-02", "distance": 1.0}"#))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let entry_id = created["id"].as_str().unwrap().to_string();

    // The row exists but is outside the caller's scope; indistinguishable
    // from a missing row.
    let (status, body) = json_response(
        app,
        Request::builder()
            .method("PUT")
            .uri(format!("/v1/entry/{entry_id}"))
            .header(header::AUTHORIZATION, format!("Bearer {other_token}"))
            .header(header::CONTENT_TYPE, UPDATE_ENTRY_TYPE)
            .body(Body::from(r#"{"distance": 99.0}"#))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        serde_json::json!({"statusCode": 404, "message": "Not found"})
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_negative_distance_is_rejected(pool: PgPool) {
    let config = test_jwt_config();
    let role_id = create_role_with_permissions(&pool, "walker", &["create-entry"]).await;
    let user = create_test_user(&pool, &generate_unique_email(), Some(role_id)).await;
    let token = create_user_token(user, Some(role_id), &config).unwrap();

    let app = init_router(test_state(pool.clone()));
    let (status, body) = json_response(
        app,
        Request::builder()
            .method("POST")
            .uri("/v1/entry")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, CREATE_ENTRY_TYPE)
            .body(Body::from(r#"{"date": "2024-01-01", "distance": -1.0}"#))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid request");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unknown_role_is_not_found(pool: PgPool) {
    let config = test_jwt_config();
    let system_token = create_system_token(&config).unwrap();

    let app = init_router(test_state(pool.clone()));
    let (status, body) = json_response(
        app,
        Request::builder()
            .uri(format!("/v1/role/{}", Uuid::new_v4()))
            .header(header::AUTHORIZATION, format!("Bearer {system_token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        serde_json::json!({"statusCode": 404, "message": "Not found"})
    );
}
