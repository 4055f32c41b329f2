use axum::{
    extract::State,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::auth::Identity;
use crate::config::AppState;
use crate::services::user_service::UserService;
use crate::utils::api_response::ResponseBuilder;
use crate::utils::validated_wrapper::ValidatedPath;

pub async fn delete_user_handler(
    State(state): State<AppState>,
    identity: Identity,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> impl IntoResponse {
    match UserService::delete_user(&state.db, identity.principal(), id, state.user_delete_policy).await {
        Ok(_) => ResponseBuilder::done("USER_DELETED", "User deleted").into_response(),
        Err(e) => e.into_response(),
    }
}
