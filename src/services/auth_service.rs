use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sea_orm::*;

use crate::auth::{require_principal, Principal};
use crate::entities::user::{self, UserRole};
use crate::errors::{ServiceError, ServiceResult};
use crate::models::auth_model::{LoginRequest, LoginResponse, ProfileResponse, RegisterRequest};
use crate::repositories::user_repository::{NewUser, UserRepository};
use crate::utils::jwt_utils::JwtUtils;

pub struct AuthService;

impl AuthService {
    /// New accounts are enabled AUTHORs.
    pub async fn register(db: &DatabaseConnection, payload: RegisterRequest) -> ServiceResult<ProfileResponse> {
        let username = payload.username.trim().to_string();
        let email = payload.email.trim().to_lowercase();

        let duplicates = UserRepository::find_duplicates(db, &username, &email).await?;
        if let Some(err) = Self::duplicate_error(&duplicates, &username) {
            return Err(err);
        }

        let password_hash = Self::hash_password(&payload.password)?;

        let txn = db.begin().await?;
        let user = UserRepository::create(
            &txn,
            NewUser {
                username,
                email,
                password_hash,
                full_name: payload.full_name,
                bio: payload.bio,
                role: UserRole::Author,
            },
        )
        .await
        .map_err(|e| {
            if ServiceError::is_unique_violation(&e) {
                ServiceError::conflict("USER_EXISTS", "Username or email already registered")
            } else {
                e.into()
            }
        })?;
        txn.commit().await?;

        tracing::info!("User {} registered", user.username);
        Ok(Self::profile_of(user))
    }

    /// Unknown user and wrong password share one message.
    pub async fn login(
        db: &DatabaseConnection,
        jwt: &JwtUtils,
        payload: LoginRequest,
    ) -> ServiceResult<LoginResponse> {
        let bad_credentials = || ServiceError::Unauthenticated {
            code: "AUTH_FAILED",
            message: "Invalid username or password".to_string(),
        };

        let user = UserRepository::find_by_username(db, payload.username.trim())
            .await?
            .ok_or_else(bad_credentials)?;

        if !Self::verify_password(&payload.password, &user.password_hash)? {
            tracing::warn!("Failed login for {}", user.username);
            return Err(bad_credentials());
        }

        if !user.enabled {
            return Err(ServiceError::forbidden("ACCOUNT_DISABLED", "This account has been disabled"));
        }

        let principal = Principal { username: user.username.clone(), role: user.role };
        let (token, token_expires_at) = jwt.generate_jwt(&principal).map_err(|e| {
            tracing::error!("Token generation failed: {}", e);
            ServiceError::Internal(e.to_string())
        })?;

        tracing::info!("User {} logged in", user.username);
        Ok(LoginResponse {
            token,
            token_expires_at,
            type_: "Bearer".to_string(),
            username: user.username,
            role: user.role,
        })
    }

    pub async fn profile(db: &DatabaseConnection, identity: Option<&Principal>) -> ServiceResult<ProfileResponse> {
        let principal = require_principal(identity)?;
        let user = UserRepository::find_by_username(db, &principal.username)
            .await?
            .ok_or_else(|| ServiceError::not_found("USER_NOT_FOUND", "User not found"))?;
        Ok(Self::profile_of(user))
    }

    pub fn hash_password(password: &str) -> ServiceResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                tracing::error!("Password hashing failed: {}", e);
                ServiceError::Internal(e.to_string())
            })
    }

    fn verify_password(password: &str, hash: &str) -> ServiceResult<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            tracing::error!("Stored password hash is unreadable: {}", e);
            ServiceError::Internal(e.to_string())
        })?;
        Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    }

    fn duplicate_error(duplicates: &[user::Model], username: &str) -> Option<ServiceError> {
        if duplicates.is_empty() {
            return None;
        }
        if duplicates.iter().any(|u| u.username == username) {
            Some(ServiceError::conflict("USERNAME_TAKEN", "Username is already taken"))
        } else {
            Some(ServiceError::conflict("EMAIL_TAKEN", "Email is already registered"))
        }
    }

    fn profile_of(user: user::Model) -> ProfileResponse {
        ProfileResponse {
            id: user.public_id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            bio: user.bio,
            role: user.role,
            created_at: user.created_at,
        }
    }
}
