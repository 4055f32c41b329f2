use crate::config::AppState;
use crate::handlers::health_check_handler;
use crate::middleware::auth_middleware::identity_middleware;
use axum::http::Method;
use axum::{middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod admin_route;
pub mod article_route;
pub mod auth_route;
pub mod category_route;
pub mod comment_route;
pub mod tag_route;

pub fn create_routes(state: AppState) -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/auth", auth_route::auth_routes())
        .nest("/api/admin", admin_route::admin_routes())
        .nest("/api/articles", article_route::article_routes())
        .nest("/api/comments", comment_route::comment_routes())
        .nest("/api/categories", category_route::category_routes())
        .nest("/api/tags", tag_route::tag_routes())
        .route("/api/health", get(health_check_handler))
        // Every route sees the caller's identity; anonymous requests pass through.
        .layer(middleware::from_fn_with_state(state, identity_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
