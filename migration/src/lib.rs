pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_tables;
mod m20250314_000001_add_movie_poster;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_tables::Migration),
            Box::new(m20250314_000001_add_movie_poster::Migration),
        ]
    }
}
