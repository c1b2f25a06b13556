pub use sea_orm_migration::prelude::*;

mod m20261016_000001_create_blogs;
mod m20261017_000002_add_blog_title_key;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261016_000001_create_blogs::Migration),
            Box::new(m20261017_000002_add_blog_title_key::Migration),
        ]
    }
}
