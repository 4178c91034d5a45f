use sea_orm_migration::prelude::*;

/// Creates the `movie` catalogue table.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Movie {
    Table,
    Id,
    Title,
    Description,
    VideoUrl,
    ThumbnailUrl,
    Genre,
    Duration,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Movie::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Movie::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Movie::Description).text().not_null())
                    .col(ColumnDef::new(Movie::VideoUrl).string_len(500).not_null())
                    .col(ColumnDef::new(Movie::ThumbnailUrl).string_len(500).not_null())
                    .col(ColumnDef::new(Movie::Genre).string_len(50).not_null())
                    .col(ColumnDef::new(Movie::Duration).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Movie::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Movie::Table).to_owned())
            .await
    }
}
