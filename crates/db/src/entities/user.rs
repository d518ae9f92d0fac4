//! User entity: an identity that can obtain tokens.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(unique)]
    pub username: String,

    /// Argon2 PHC string.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Unrestricted access to every resource.
    #[sea_orm(default_value = false)]
    pub is_admin: bool,

    #[sea_orm(default_value = true)]
    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
