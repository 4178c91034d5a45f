use sea_orm_migration::prelude::*;

/// Creates the `profil` table ("who's watching" sub-accounts).
///
/// `favorite_ids` is a JSON array of movie ids so the same schema works on
/// Postgres and SQLite.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Profil {
    Table,
    Id,
    UserId,
    Name,
    Image,
    InUse,
    FavoriteIds,
    CreatedAt,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profil::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Profil::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Profil::UserId).uuid().not_null())
                    .col(ColumnDef::new(Profil::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Profil::Image).string_len(500).null())
                    .col(
                        ColumnDef::new(Profil::InUse)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Profil::FavoriteIds).json().not_null())
                    .col(
                        ColumnDef::new(Profil::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profil_user_id")
                            .from(Profil::Table, Profil::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_profil_user_id")
                    .table(Profil::Table)
                    .col(Profil::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Profil::Table).to_owned())
            .await
    }
}
