use sea_orm::*;
use uuid::Uuid;

use crate::entities::{user, user::Entity as User, user::UserRole};

pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub role: UserRole,
}

pub struct UserRepository;

impl UserRepository {
    pub async fn find_by_username<C: ConnectionTrait>(
        db: &C,
        username: &str,
    ) -> Result<Option<user::Model>, DbErr> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(db)
            .await
    }

    pub async fn find_by_public_id<C: ConnectionTrait>(
        db: &C,
        public_id: Uuid,
    ) -> Result<Option<user::Model>, DbErr> {
        User::find()
            .filter(user::Column::PublicId.eq(public_id))
            .one(db)
            .await
    }

    // Returns every row clashing on username OR email so the caller can say which
    pub async fn find_duplicates<C: ConnectionTrait>(
        db: &C,
        username: &str,
        email: &str,
    ) -> Result<Vec<user::Model>, DbErr> {
        User::find()
            .filter(
                Condition::any()
                    .add(user::Column::Email.eq(email))
                    .add(user::Column::Username.eq(username)),
            )
            .all(db)
            .await
    }

    pub async fn create<C: ConnectionTrait>(db: &C, new_user: NewUser) -> Result<user::Model, DbErr> {
        user::ActiveModel {
            id: NotSet,
            public_id: Set(Uuid::now_v7()),
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            full_name: Set(new_user.full_name),
            bio: Set(new_user.bio),
            role: Set(new_user.role),
            enabled: Set(true),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(db)
        .await
    }
}
