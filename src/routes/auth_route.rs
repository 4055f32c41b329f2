use axum::{routing::{get, post}, Router};
use crate::config::AppState;
use crate::handlers::auth_handler::*;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_user_handler))
        .route("/login", post(login_user_handler))
        .route("/profile", get(get_profile_handler))
}
