use sea_orm_migration::prelude::*;

/// Creates `movie_watch_time`, one row per (user, profile, movie).
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum MovieWatchTime {
    Table,
    Id,
    UserId,
    ProfilId,
    MovieId,
    Time,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Profil {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Movie {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MovieWatchTime::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MovieWatchTime::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MovieWatchTime::UserId).uuid().not_null())
                    .col(ColumnDef::new(MovieWatchTime::ProfilId).uuid().not_null())
                    .col(ColumnDef::new(MovieWatchTime::MovieId).uuid().not_null())
                    .col(
                        ColumnDef::new(MovieWatchTime::Time)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(MovieWatchTime::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_watch_time_user_id")
                            .from(MovieWatchTime::Table, MovieWatchTime::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_watch_time_profil_id")
                            .from(MovieWatchTime::Table, MovieWatchTime::ProfilId)
                            .to(Profil::Table, Profil::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_watch_time_movie_id")
                            .from(MovieWatchTime::Table, MovieWatchTime::MovieId)
                            .to(Movie::Table, Movie::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_watch_time_user_profil_movie")
                    .table(MovieWatchTime::Table)
                    .col(MovieWatchTime::UserId)
                    .col(MovieWatchTime::ProfilId)
                    .col(MovieWatchTime::MovieId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MovieWatchTime::Table).to_owned())
            .await
    }
}
