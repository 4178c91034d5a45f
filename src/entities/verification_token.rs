use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Pending email confirmation. Consumed by the new-verification endpoint.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "verification_token")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Account that requested the token; for an email change it still has the old address.
    pub user_id: Option<Uuid>,
    pub email: String,
    pub token: String,
    pub expires: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
