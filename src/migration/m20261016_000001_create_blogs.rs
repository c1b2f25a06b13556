use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Blogs::Table)
                    .if_not_exists()
                    .col(pk_auto(Blogs::Id))
                    .col(string(Blogs::Title))
                    .col(text(Blogs::Content))
                    .col(string(Blogs::Author))
                    .col(string(Blogs::ContentSource))
                    .col(timestamp_with_time_zone(Blogs::Timestamp))
                    .col(double(Blogs::OverallRating).default(0.0))
                    .col(string(Blogs::Tags).default(""))
                    .col(json(Blogs::RelatedPosts))
                    .col(json(Blogs::Reviews))
                    .col(string_null(Blogs::Status))
                    .to_owned(),
            )
            .await?;

        // listing and search both read newest first
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_blogs_timestamp")
                    .table(Blogs::Table)
                    .col(Blogs::Timestamp)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Blogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Blogs {
    Table,
    Id,
    Title,
    Content,
    Author,
    ContentSource,
    Timestamp,
    OverallRating,
    Tags,
    RelatedPosts,
    Reviews,
    Status,
}
