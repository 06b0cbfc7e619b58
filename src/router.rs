use axum::http::{HeaderValue, Method, StatusCode};
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::middleware::auth::attach_authentication_context;
use crate::modules::auth::router::init_auth_router;
use crate::modules::entries::router::init_entries_router;
use crate::modules::goals::router::init_goals_router;
use crate::modules::roles::router::{init_permissions_router, init_roles_router};
use crate::modules::users::router::init_users_router;
use crate::state::AppState;

async fn health() -> StatusCode {
    StatusCode::OK
}

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/health", axum::routing::get(health))
        .nest(
            "/v1",
            Router::new()
                // Authenticate/token/authorize sit directly under /v1.
                .merge(init_auth_router())
                .nest("/user", init_users_router())
                .nest("/entry", init_entries_router())
                .nest("/goal", init_goals_router())
                .nest("/role", init_roles_router())
                .nest("/permission", init_permissions_router()),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            attach_authentication_context,
        ))
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(logging_middleware))
}
