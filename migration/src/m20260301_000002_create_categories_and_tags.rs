use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Categories::Table)
                .if_not_exists()
                .col(ColumnDef::new(Categories::Id).big_integer().not_null().auto_increment().primary_key())
                .col(ColumnDef::new(Categories::PublicId).uuid().not_null().unique_key())
                .col(ColumnDef::new(Categories::Name).string().not_null().unique_key())
                .col(ColumnDef::new(Categories::Slug).string().not_null().unique_key())
                .col(ColumnDef::new(Categories::Description).text().null())
                .col(ColumnDef::new(Categories::CreatedAt).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
                .to_owned(),
        ).await?;

        manager.create_table(
            Table::create()
                .table(Tags::Table)
                .if_not_exists()
                .col(ColumnDef::new(Tags::Id).big_integer().not_null().auto_increment().primary_key())
                .col(ColumnDef::new(Tags::PublicId).uuid().not_null().unique_key())
                .col(ColumnDef::new(Tags::Name).string().not_null().unique_key())
                .col(ColumnDef::new(Tags::Slug).string().not_null().unique_key())
                .col(ColumnDef::new(Tags::CreatedAt).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
                .to_owned(),
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Tags::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Categories::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(Iden)]
pub enum Categories {
    Table,
    Id,
    PublicId,
    Name,
    Slug,
    Description,
    CreatedAt,
}

#[derive(Iden)]
pub enum Tags {
    Table,
    Id,
    PublicId,
    Name,
    Slug,
    CreatedAt,
}
