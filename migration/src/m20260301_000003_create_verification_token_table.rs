use sea_orm_migration::prelude::*;

/// Creates the `verification_token` table used to confirm email addresses.
///
/// `user_id` names the account that requested the token. For an email change the
/// account still holds its old address, so the token's email alone cannot find it.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum VerificationToken {
    Table,
    Id,
    UserId,
    Email,
    Token,
    Expires,
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
                    .table(VerificationToken::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VerificationToken::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VerificationToken::UserId).uuid().null())
                    .col(ColumnDef::new(VerificationToken::Email).string_len(255).not_null())
                    .col(
                        ColumnDef::new(VerificationToken::Token)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(VerificationToken::Expires)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_verification_token_user_id")
                            .from(VerificationToken::Table, VerificationToken::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_verification_token_email")
                    .table(VerificationToken::Table)
                    .col(VerificationToken::Email)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VerificationToken::Table).to_owned())
            .await
    }
}
