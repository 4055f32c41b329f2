pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_users;
mod m20260301_000002_create_categories_and_tags;
mod m20260301_000003_create_articles_and_comments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_users::Migration),
            Box::new(m20260301_000002_create_categories_and_tags::Migration),
            Box::new(m20260301_000003_create_articles_and_comments::Migration),
        ]
    }
}
