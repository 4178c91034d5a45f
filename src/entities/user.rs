use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account role. Stored as the upper-case strings `ADMIN` / `USER`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    #[sea_orm(string_value = "USER")]
    User,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: Option<String>,
    #[sea_orm(unique)]
    pub email: String,
    pub email_verified: Option<DateTimeWithTimeZone>,
    pub image: Option<String>,
    /// Argon2 hash; `None` for accounts that only sign in through OAuth.
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub role: UserRole,
    pub is_two_factor_enabled: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::account::Entity")]
    Account,
    #[sea_orm(has_many = "super::profil::Entity")]
    Profil,
    #[sea_orm(has_many = "super::refresh_token::Entity")]
    RefreshToken,
    #[sea_orm(has_one = "super::two_factor_confirmation::Entity")]
    TwoFactorConfirmation,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::profil::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profil.def()
    }
}

impl Related<super::refresh_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RefreshToken.def()
    }
}

impl Related<super::two_factor_confirmation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TwoFactorConfirmation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
