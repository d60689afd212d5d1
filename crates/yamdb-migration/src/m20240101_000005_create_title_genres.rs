use sea_orm_migration::prelude::*;

use super::m20240101_000003_create_genres::Genres;
use super::m20240101_000004_create_titles::Titles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TitleGenres::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TitleGenres::TitleId).uuid().not_null())
                    .col(ColumnDef::new(TitleGenres::GenreId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(TitleGenres::TitleId)
                            .col(TitleGenres::GenreId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_title_genres_title_id")
                            .from(TitleGenres::Table, TitleGenres::TitleId)
                            .to(Titles::Table, Titles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_title_genres_genre_id")
                            .from(TitleGenres::Table, TitleGenres::GenreId)
                            .to(Genres::Table, Genres::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_title_genres_genre_id")
                    .table(TitleGenres::Table)
                    .col(TitleGenres::GenreId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TitleGenres::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TitleGenres {
    Table,
    TitleId,
    GenreId,
}
