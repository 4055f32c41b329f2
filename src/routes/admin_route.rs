use axum::{routing::delete, Router};
use crate::config::AppState;
use crate::handlers::admin_handler::*;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users/{id}", delete(delete_user_handler))
}
