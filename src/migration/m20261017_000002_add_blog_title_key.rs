use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Blogs::Table)
                    .add_column(string(Blogs::TitleKey).default(""))
                    .to_owned(),
            )
            .await?;

        // rows written before the key existed; new rows get a Unicode-folded key on insert
        manager
            .get_connection()
            .execute_unprepared("UPDATE blogs SET title_key = LOWER(title)")
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Blogs::Table)
                    .drop_column(Blogs::TitleKey)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Blogs {
    Table,
    TitleKey,
}
