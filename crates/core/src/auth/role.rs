//! Ordered roles and the capabilities they grant.

use serde::{Deserialize, Serialize};

use crate::error::StockError;

/// Caller role.
///
/// Roles are ordered from lowest to highest privilege.
/// Higher roles can perform all actions of lower roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Read-only access.
    Viewer = 0,
    /// Rings up sales.
    Cashier = 1,
    /// Manages stock, catalogue and reversals.
    Manager = 2,
    /// Manages users.
    Admin = 3,
}

impl Role {
    /// Parse a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "viewer" => Some(Self::Viewer),
            "cashier" => Some(Self::Cashier),
            "manager" => Some(Self::Manager),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Cashier => "cashier",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }

    /// Whether this role grants `capability`.
    #[must_use]
    pub fn can(self, capability: Capability) -> bool {
        self >= capability.required_role()
    }

    /// Fails with `Validation` for unknown role names.
    pub fn try_from_str(s: &str) -> Result<Self, StockError> {
        Self::parse(s).ok_or_else(|| StockError::Validation(format!("unknown role: {s}")))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something a route lets the caller do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// List and get any entity.
    Read,
    /// Create sales and sale items, edit sale metadata.
    RecordSales,
    /// Reverse sale items, delete or restore sales.
    ReverseSales,
    /// Create, delete and restore stock batches.
    ManageStock,
    /// Products, variants/SKUs, suppliers and manufacturers.
    ManageCatalog,
    /// Create, delete and restore users.
    ManageUsers,
}

impl Capability {
    /// Minimum role granting this capability.
    #[must_use]
    pub const fn required_role(self) -> Role {
        match self {
            Self::Read => Role::Viewer,
            Self::RecordSales => Role::Cashier,
            Self::ReverseSales | Self::ManageStock | Self::ManageCatalog => Role::Manager,
            Self::ManageUsers => Role::Admin,
        }
    }
}
