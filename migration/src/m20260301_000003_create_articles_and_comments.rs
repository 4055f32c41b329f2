use sea_orm_migration::prelude::*;

use crate::m20260301_000001_create_users::Users;
use crate::m20260301_000002_create_categories_and_tags::{Categories, Tags};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. Articles
        // Author FK is RESTRICT: removing a user goes through the explicit deletion policy.
        manager.create_table(
            Table::create()
                .table(Articles::Table)
                .if_not_exists()
                .col(ColumnDef::new(Articles::Id).big_integer().not_null().auto_increment().primary_key())
                .col(ColumnDef::new(Articles::PublicId).uuid().not_null().unique_key())
                .col(ColumnDef::new(Articles::Title).string().not_null())
                .col(ColumnDef::new(Articles::Slug).string().not_null().unique_key())
                .col(ColumnDef::new(Articles::Content).text().not_null())
                .col(ColumnDef::new(Articles::Excerpt).string().null())
                .col(ColumnDef::new(Articles::FeaturedImage).string().null())
                .col(ColumnDef::new(Articles::Status).string().not_null().default("DRAFT"))
                .col(ColumnDef::new(Articles::ViewCount).big_integer().not_null().default(0))
                .col(ColumnDef::new(Articles::AuthorId).big_integer().not_null())
                .col(ColumnDef::new(Articles::CategoryId).big_integer().null())
                .col(ColumnDef::new(Articles::CreatedAt).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
                .col(ColumnDef::new(Articles::UpdatedAt).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_articles_author_id")
                        .from(Articles::Table, Articles::AuthorId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Restrict)
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_articles_category_id")
                        .from(Articles::Table, Articles::CategoryId)
                        .to(Categories::Table, Categories::Id)
                        .on_delete(ForeignKeyAction::SetNull)
                )
                .to_owned(),
        ).await?;

        manager.create_index(Index::create().name("idx_articles_status").table(Articles::Table).col(Articles::Status).to_owned()).await?;
        manager.create_index(Index::create().name("idx_articles_author_id").table(Articles::Table).col(Articles::AuthorId).to_owned()).await?;
        manager.create_index(Index::create().name("idx_articles_category_id").table(Articles::Table).col(Articles::CategoryId).to_owned()).await?;

        // 2. ArticleTags (Many-to-Many)
        manager.create_table(
            Table::create()
                .table(ArticleTags::Table)
                .if_not_exists()
                .col(ColumnDef::new(ArticleTags::ArticleId).big_integer().not_null())
                .col(ColumnDef::new(ArticleTags::TagId).big_integer().not_null())
                .primary_key(Index::create().col(ArticleTags::ArticleId).col(ArticleTags::TagId))
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_article_tags_article_id")
                        .from(ArticleTags::Table, ArticleTags::ArticleId)
                        .to(Articles::Table, Articles::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_article_tags_tag_id")
                        .from(ArticleTags::Table, ArticleTags::TagId)
                        .to(Tags::Table, Tags::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .to_owned(),
        ).await?;

        // 3. Comments
        manager.create_table(
            Table::create()
                .table(Comments::Table)
                .if_not_exists()
                .col(ColumnDef::new(Comments::Id).big_integer().not_null().auto_increment().primary_key())
                .col(ColumnDef::new(Comments::PublicId).uuid().not_null().unique_key())
                .col(ColumnDef::new(Comments::Content).text().not_null())
                .col(ColumnDef::new(Comments::ArticleId).big_integer().not_null())
                .col(ColumnDef::new(Comments::UserId).big_integer().not_null())
                .col(ColumnDef::new(Comments::CreatedAt).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
                .col(ColumnDef::new(Comments::UpdatedAt).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_comments_article_id")
                        .from(Comments::Table, Comments::ArticleId)
                        .to(Articles::Table, Articles::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_comments_user_id")
                        .from(Comments::Table, Comments::UserId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Restrict)
                )
                .to_owned(),
        ).await?;

        manager.create_index(Index::create().name("idx_comments_article_id").table(Comments::Table).col(Comments::ArticleId).to_owned()).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Comments::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(ArticleTags::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Articles::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(Iden)]
enum Articles {
    Table,
    Id,
    PublicId,
    Title,
    Slug,
    Content,
    Excerpt,
    FeaturedImage,
    Status,
    ViewCount,
    AuthorId,
    CategoryId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ArticleTags {
    Table,
    ArticleId,
    TagId,
}

#[derive(Iden)]
enum Comments {
    Table,
    Id,
    PublicId,
    Content,
    ArticleId,
    UserId,
    CreatedAt,
    UpdatedAt,
}
