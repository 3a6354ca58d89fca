//! `SeaORM` active enums mirroring Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use stockwise_core::auth::Role;

/// `user_role` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Read-only.
    #[sea_orm(string_value = "viewer")]
    Viewer,
    /// Records sales.
    #[sea_orm(string_value = "cashier")]
    Cashier,
    /// Manages stock and catalogue.
    #[sea_orm(string_value = "manager")]
    Manager,
    /// Manages users.
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl From<UserRole> for Role {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Viewer => Self::Viewer,
            UserRole::Cashier => Self::Cashier,
            UserRole::Manager => Self::Manager,
            UserRole::Admin => Self::Admin,
        }
    }
}

impl From<Role> for UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Viewer => Self::Viewer,
            Role::Cashier => Self::Cashier,
            Role::Manager => Self::Manager,
            Role::Admin => Self::Admin,
        }
    }
}
