pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_user_table;
mod m20260301_000002_create_account_table;
mod m20260301_000003_create_verification_token_table;
mod m20260301_000004_create_password_reset_token_table;
mod m20260301_000005_create_two_factor_tables;
mod m20260301_000006_create_refresh_token_table;
mod m20260302_000001_create_movie_table;
mod m20260302_000002_create_profil_table;
mod m20260302_000003_create_movie_watch_time_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_user_table::Migration),
            Box::new(m20260301_000002_create_account_table::Migration),
            Box::new(m20260301_000003_create_verification_token_table::Migration),
            Box::new(m20260301_000004_create_password_reset_token_table::Migration),
            Box::new(m20260301_000005_create_two_factor_tables::Migration),
            Box::new(m20260301_000006_create_refresh_token_table::Migration),
            Box::new(m20260302_000001_create_movie_table::Migration),
            Box::new(m20260302_000002_create_profil_table::Migration),
            Box::new(m20260302_000003_create_movie_watch_time_table::Migration),
        ]
    }
}
