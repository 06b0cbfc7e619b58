use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{create_goal, delete_goal, get_goal, list_goals, update_goal};

pub fn init_goals_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_goal).get(list_goals))
        .route("/{id}", get(get_goal).put(update_goal).delete(delete_goal))
}
