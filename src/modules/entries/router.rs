use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{create_entry, delete_entry, get_entry, search_entries, update_entry};

pub fn init_entries_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_entry).get(search_entries))
        .route(
            "/{id}",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
}
