use axum::{routing::put, Router};
use crate::config::AppState;
use crate::handlers::comment_handler::*;

pub fn comment_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", put(update_comment_handler).delete(delete_comment_handler))
}
