use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_categories::Categories;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Titles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Titles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Titles::Name).string_len(100).not_null())
                    // Upper bound moves with the calendar, so only the floor lives in the schema
                    .col(
                        ColumnDef::new(Titles::Year)
                            .integer()
                            .null()
                            .check(Expr::col(Titles::Year).gte(1600)),
                    )
                    .col(ColumnDef::new(Titles::CategoryId).uuid().null())
                    .col(
                        ColumnDef::new(Titles::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_titles_category_id")
                            .from(Titles::Table, Titles::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_titles_category_id")
                    .table(Titles::Table)
                    .col(Titles::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_titles_name")
                    .table(Titles::Table)
                    .col(Titles::Name)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Titles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Titles {
    Table,
    Id,
    Name,
    Year,
    CategoryId,
    Description,
}
