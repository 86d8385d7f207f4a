//! Table name configuration.

use serde::{Deserialize, Serialize};

use crate::{ident, prelude::*};

/// Where permission and role rows live.
///
/// The role to permission pivot is part of this process-wide set: every
/// role shares it, unlike the per-host pivots in [`AuthorizableConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableNames {
    /// Permission rows.
    pub permissions: String,
    /// Role rows.
    pub roles: String,
    /// Pivot granting permissions to roles.
    pub role_has_permissions: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            permissions: String::from("permissions"),
            roles: String::from("roles"),
            role_has_permissions: String::from("role_has_permissions"),
        }
    }
}

impl TableNames {
    /// Check every table name is a usable identifier.
    pub fn validate(&self) -> Result<()> {
        ident::validate(&self.permissions)?;
        ident::validate(&self.roles)?;
        ident::validate(&self.role_has_permissions)
    }
}

/// Pivot tables for one authorizable host entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizableConfig {
    /// Pivot granting permissions directly to the host entity.
    pub permissions_pivot_table: String,
    /// Pivot assigning roles to the host entity.
    pub roles_pivot_table: String,
}

impl Default for AuthorizableConfig {
    fn default() -> Self {
        Self {
            permissions_pivot_table: String::from("model_has_permissions"),
            roles_pivot_table: String::from("model_has_roles"),
        }
    }
}

impl AuthorizableConfig {
    /// Creates a pivot configuration from the two table names.
    pub fn new(
        permissions_pivot_table: impl Into<String>,
        roles_pivot_table: impl Into<String>,
    ) -> Self {
        Self {
            permissions_pivot_table: permissions_pivot_table.into(),
            roles_pivot_table: roles_pivot_table.into(),
        }
    }

    /// Check both pivot names are usable identifiers.
    pub fn validate(&self) -> Result<()> {
        ident::validate(&self.permissions_pivot_table)?;
        ident::validate(&self.roles_pivot_table)
    }
}
