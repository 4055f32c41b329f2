pub mod user_seeder;

use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::errors::ServiceResult;

pub async fn run_seeders(db: &DatabaseConnection, cfg: &Config) -> ServiceResult<()> {
    if let Some(admin) = &cfg.admin_bootstrap {
        user_seeder::seed_admin(db, admin).await?;
    }
    Ok(())
}
