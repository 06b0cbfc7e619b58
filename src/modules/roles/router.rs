use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_role, delete_role, get_role, list_permissions, list_roles, update_role,
};

pub fn init_roles_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_role).get(list_roles))
        .route("/{id}", get(get_role).put(update_role).delete(delete_role))
}

pub fn init_permissions_router() -> Router<AppState> {
    Router::new().route("/", get(list_permissions))
}
