pub use sea_orm_migration::prelude::*;

mod m20240210_000001_create_user_table;
mod m20240210_000002_create_company_table;
mod m20240211_000003_create_follow_table;
mod m20240305_000004_add_reset_columns;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240210_000001_create_user_table::Migration),
            Box::new(m20240210_000002_create_company_table::Migration),
            Box::new(m20240211_000003_create_follow_table::Migration),
            Box::new(m20240305_000004_add_reset_columns::Migration),
        ]
    }
}
