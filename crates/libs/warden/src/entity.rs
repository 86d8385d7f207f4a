//! Permission and role rows, and the refs callers name them by.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named permission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    /// Row ID.
    pub id: i64,
    /// Unique, case-sensitive name.
    pub name: String,
    /// When this permission was created.
    pub created_at: DateTime<Utc>,
    /// When this permission was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A named role. Roles carry permissions of their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    /// Row ID.
    pub id: i64,
    /// Unique, case-sensitive name.
    pub name: String,
    /// When this role was created.
    pub created_at: DateTime<Utc>,
    /// When this role was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A role together with its preloaded permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleWithPermissions {
    /// The role.
    pub role: Role,
    /// Permissions granted to the role, in ID order.
    pub permissions: Vec<Permission>,
}

/// Rows addressable by ID and name.
pub trait Named {
    /// Row ID.
    fn id(&self) -> i64;
    /// Unique name.
    fn name(&self) -> &str;
}

impl Named for Permission {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Role {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A row given either by name or as an already loaded entity.
///
/// Name refs are resolved through find-or-create when an ID is needed,
/// entity refs are used as they are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ref<T> {
    /// Lookup by unique name.
    Name(String),
    /// A resolved row.
    Entity(T),
}

/// A permission given by name or as a row.
pub type PermissionRef = Ref<Permission>;

/// A role given by name or as a row.
pub type RoleRef = Ref<Role>;

impl<T: Named> Ref<T> {
    /// The name this ref points at.
    pub fn name(&self) -> &str {
        match self {
            Ref::Name(name) => name,
            Ref::Entity(entity) => entity.name(),
        }
    }

    /// The row ID, when the ref is already resolved.
    pub fn id(&self) -> Option<i64> {
        match self {
            Ref::Name(_) => None,
            Ref::Entity(entity) => Some(entity.id()),
        }
    }
}

impl<T> From<&str> for Ref<T> {
    fn from(value: &str) -> Self {
        Ref::Name(String::from(value))
    }
}

impl<T> From<&String> for Ref<T> {
    fn from(value: &String) -> Self {
        Ref::Name(value.clone())
    }
}

impl<T> From<String> for Ref<T> {
    fn from(value: String) -> Self {
        Ref::Name(value)
    }
}

impl From<Permission> for PermissionRef {
    fn from(value: Permission) -> Self {
        Ref::Entity(value)
    }
}

impl From<&Permission> for PermissionRef {
    fn from(value: &Permission) -> Self {
        Ref::Entity(value.clone())
    }
}

impl From<Role> for RoleRef {
    fn from(value: Role) -> Self {
        Ref::Entity(value)
    }
}

impl From<&Role> for RoleRef {
    fn from(value: &Role) -> Self {
        Ref::Entity(value.clone())
    }
}
