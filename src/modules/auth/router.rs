use axum::{
    Router,
    routing::{post, put},
};

use crate::state::AppState;

use super::controller::{authenticate, authorize, refresh_token};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/authenticate", post(authenticate))
        .route("/token", put(refresh_token))
        .route("/authorize", post(authorize))
}
