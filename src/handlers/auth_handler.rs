use axum::{extract::State, response::IntoResponse};

use crate::auth::Identity;
use crate::config::AppState;
use crate::models::auth_model::{LoginRequest, RegisterRequest};
use crate::services::auth_service::AuthService;
use crate::utils::api_response::ResponseBuilder;
use crate::utils::validated_wrapper::ValidatedJson;

pub async fn register_user_handler(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> impl IntoResponse {
    match AuthService::register(&state.db, payload).await {
        Ok(user) => ResponseBuilder::created("AUTH_REGISTER_SUCCESS", "User registered successfully", user)
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn login_user_handler(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> impl IntoResponse {
    match AuthService::login(&state.db, &state.jwt, payload).await {
        Ok(res) => ResponseBuilder::success("AUTH_LOGIN_SUCCESS", "Login successful", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_profile_handler(
    State(state): State<AppState>,
    identity: Identity,
) -> impl IntoResponse {
    match AuthService::profile(&state.db, identity.principal()).await {
        Ok(res) => ResponseBuilder::success("PROFILE_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}
