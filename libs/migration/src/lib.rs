pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_courses;
mod m20250301_000002_create_user_courses;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_courses::Migration),
            Box::new(m20250301_000002_create_user_courses::Migration),
        ]
    }
}
