use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::errors::ErrorKind;

use crate::auth::Principal;
use crate::config::AppState;
use crate::repositories::user_repository::UserRepository;
use crate::utils::api_response::ResponseBuilder;

/// Resolves the bearer token, when one is sent, into a [`Principal`] extension.
///
/// Requests without an `Authorization` header pass through anonymously; a
/// header that is present but unusable is rejected with 401.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = match req.headers().get(header::AUTHORIZATION) {
        Some(header) => header,
        None => return next.run(req).await,
    };

    let auth_str = match auth_header.to_str() {
        Ok(s) => s,
        Err(_) => {
            return ResponseBuilder::error::<()>(
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_FORMAT",
                "Invalid Authorization header format",
            )
            .into_response();
        }
    };

    let token = match auth_str.strip_prefix("Bearer ") {
        Some(token) => token.trim(),
        None => {
            return ResponseBuilder::error::<()>(
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_SCHEME",
                "Invalid token format. Missing 'Bearer ' prefix",
            )
            .into_response();
        }
    };

    let claims = match state.jwt.validate_jwt(token) {
        Ok(data) => data.claims,
        Err(e) => {
            let (code, message) = match e.kind() {
                ErrorKind::ExpiredSignature => ("TOKEN_EXPIRED", "Token has expired"),
                ErrorKind::InvalidSignature => ("TOKEN_BAD_SIGNATURE", "Invalid token signature"),
                _ => ("TOKEN_INVALID", "Token is invalid"),
            };
            return ResponseBuilder::error::<()>(StatusCode::UNAUTHORIZED, code, message).into_response();
        }
    };

    // The token only names the user; role and enabled flag come from the store.
    let user = match UserRepository::find_by_username(&state.db, &claims.sub).await {
        Ok(Some(user)) if user.enabled => user,
        Ok(_) => {
            return ResponseBuilder::error::<()>(
                StatusCode::UNAUTHORIZED,
                "AUTH_USER_INACTIVE",
                "Account no longer exists or is disabled",
            )
            .into_response();
        }
        Err(e) => {
            tracing::error!("Identity lookup failed: {}", e);
            return ResponseBuilder::error::<()>(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred",
            )
            .into_response();
        }
    };

    req.extensions_mut().insert(Principal {
        username: user.username,
        role: user.role,
    });

    next.run(req).await
}
