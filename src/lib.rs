pub mod auth;
pub mod config;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod seeders;
pub mod services;
pub mod utils;

use axum::Router;

use crate::config::AppState;

/// The full HTTP surface with state attached, ready to serve.
pub fn build_app(state: AppState) -> Router {
    routes::create_routes(state.clone()).with_state(state)
}
