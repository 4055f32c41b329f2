use sea_orm::*;
use uuid::Uuid;

use crate::auth::{require_admin, Principal};
use crate::config::UserDeletePolicy;
use crate::entities::{article, comment, user};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::user_repository::UserRepository;
use crate::services::article_service::ArticleService;

pub struct UserService;

impl UserService {
    /// Admin-only. The policy decides what happens to the user's content.
    pub async fn delete_user(
        db: &DatabaseConnection,
        identity: Option<&Principal>,
        user_id: Uuid,
        policy: UserDeletePolicy,
    ) -> ServiceResult<()> {
        let admin = require_admin(identity)?;
        let txn = db.begin().await?;

        let target = UserRepository::find_by_public_id(&txn, user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("USER_NOT_FOUND", "User not found"))?;

        let comments = comment::Entity::find()
            .filter(comment::Column::UserId.eq(target.id));
        let articles = article::Entity::find()
            .filter(article::Column::AuthorId.eq(target.id));

        match policy {
            UserDeletePolicy::Block => {
                let owned = articles.count(&txn).await? + comments.count(&txn).await?;
                if owned > 0 {
                    return Err(ServiceError::conflict(
                        "USER_HAS_CONTENT",
                        format!("User {} still owns {} articles or comments", target.username, owned),
                    ));
                }
            }
            UserDeletePolicy::Cascade => {
                comment::Entity::delete_many()
                    .filter(comment::Column::UserId.eq(target.id))
                    .exec(&txn)
                    .await?;
                for owned in articles.all(&txn).await? {
                    ArticleService::purge(&txn, owned.id).await?;
                }
            }
        }

        user::Entity::delete_by_id(target.id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!("User {} deleted by {} ({:?})", target.username, admin.username, policy);
        Ok(())
    }
}
