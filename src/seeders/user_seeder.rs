use sea_orm::*;

use crate::config::AdminBootstrap;
use crate::entities::user::UserRole;
use crate::errors::ServiceResult;
use crate::repositories::user_repository::{NewUser, UserRepository};
use crate::services::auth_service::AuthService;

/// Creates the bootstrap ADMIN once. An existing username is left untouched.
pub async fn seed_admin(db: &DatabaseConnection, admin: &AdminBootstrap) -> ServiceResult<bool> {
    if UserRepository::find_by_username(db, &admin.username).await?.is_some() {
        return Ok(false);
    }

    let password_hash = AuthService::hash_password(&admin.password)?;

    let txn = db.begin().await?;
    let created = UserRepository::create(
        &txn,
        NewUser {
            username: admin.username.clone(),
            email: admin.email.trim().to_lowercase(),
            password_hash,
            full_name: None,
            bio: None,
            role: UserRole::Admin,
        },
    )
    .await?;
    txn.commit().await?;

    tracing::info!("Seeded admin account {}", created.username);
    Ok(true)
}
