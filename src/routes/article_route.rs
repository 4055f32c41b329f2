use axum::{extract::DefaultBodyLimit, routing::{get, post, put}, Router};
use crate::config::AppState;
use crate::handlers::article_handler::*;
use crate::handlers::comment_handler::{create_comment_handler, list_comments_handler};
use crate::services::storage_service::MAX_IMAGE_BYTES;

pub fn article_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_published_handler).post(create_article_handler))
        .route("/slug/{slug}", get(get_by_slug_handler))
        .route("/category/{id}", get(list_by_category_handler))
        .route("/tag/{id}", get(list_by_tag_handler))
        .route("/search", get(search_handler))
        .route("/mine", get(list_mine_handler))
        .route("/{id}", put(update_article_handler).delete(delete_article_handler))
        .route(
            "/{id}/image",
            // Leave room for the multipart framing around a maximum-size image.
            post(upload_image_handler).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 64 * 1024)),
        )
        .route("/{id}/comments", get(list_comments_handler).post(create_comment_handler))
}
