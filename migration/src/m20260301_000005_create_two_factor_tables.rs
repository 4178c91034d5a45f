use sea_orm_migration::prelude::*;

/// Creates `two_factor_token` (emailed login codes) and `two_factor_confirmation`
/// (at most one per user, marks a completed second factor).
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TwoFactorToken::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TwoFactorToken::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TwoFactorToken::Email)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TwoFactorToken::Token)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TwoFactorToken::Expires)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Six-digit codes can repeat across addresses, so uniqueness is per email
        manager
            .create_index(
                Index::create()
                    .name("idx_two_factor_token_email_token")
                    .table(TwoFactorToken::Table)
                    .col(TwoFactorToken::Email)
                    .col(TwoFactorToken::Token)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TwoFactorConfirmation::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TwoFactorConfirmation::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TwoFactorConfirmation::UserId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_two_factor_confirmation_user_id")
                            .from(TwoFactorConfirmation::Table, TwoFactorConfirmation::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TwoFactorConfirmation::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TwoFactorToken::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TwoFactorToken {
    Table,
    Id,
    Email,
    Token,
    Expires,
}

#[derive(DeriveIden)]
enum TwoFactorConfirmation {
    Table,
    Id,
    UserId,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}
