//! The persistence seam.
//!
//! The capabilities never talk to a database directly. They resolve names
//! through a [`Catalog`] and read or mutate grants through a [`Relation`]
//! bound to one owner row over one pivot table. A [`Store`] hands both out.

use std::future::Future;

use crate::{
    entity::{Named, Permission, Ref, Role, RoleWithPermissions},
    prelude::*,
};

/// Find-or-create access to permission or role rows.
pub trait Catalog<T>: Send + Sync {
    /// Return the row named `name`, creating it when absent.
    ///
    /// Concurrent callers racing on the same new name must end up with the
    /// same row.
    fn first_or_create(&self, name: &str) -> impl Future<Output = Result<T>> + Send;

    /// Return the row named `name`, if any.
    fn find_by_name(&self, name: &str) -> impl Future<Output = Result<Option<T>>> + Send;

    /// Every row, in ID order.
    fn all(&self) -> impl Future<Output = Result<Vec<T>>> + Send;
}

/// A many-to-many relation from one owner row to related rows.
///
/// Grants form a set: attaching an existing grant is a no-op.
pub trait Relation<T>: Send + Sync {
    /// Whether a related row named `name` exists. Issues one query.
    fn exists(&self, name: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Load every related row, in ID order.
    fn load(&self) -> impl Future<Output = Result<Vec<T>>> + Send;

    /// Names of the related rows, in ID order.
    fn names(&self) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Grant the given rows.
    fn attach(&self, ids: &[i64]) -> impl Future<Output = Result<()>> + Send;

    /// Remove the given grants if present.
    fn detach(&self, ids: &[i64]) -> impl Future<Output = Result<()>> + Send;

    /// Replace the grant set with exactly `ids`.
    fn sync(&self, ids: &[i64]) -> impl Future<Output = Result<()>> + Send;
}

/// An owner to role relation that can see through to the roles' permissions.
pub trait RoleRelation: Relation<Role> {
    /// Whether any related role has a permission named `permission`.
    /// Issues one query.
    fn exists_with_permission(
        &self,
        permission: &str,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Load the related roles with their permissions preloaded.
    fn load_with_permissions(
        &self,
    ) -> impl Future<Output = Result<Vec<RoleWithPermissions>>> + Send;
}

/// Pivot table layout: the table and its two key columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pivot {
    /// Pivot table name.
    pub table: String,
    /// Column referencing the owner row.
    pub owner_key: String,
    /// Column referencing the related row.
    pub related_key: String,
}

impl Pivot {
    /// Host entity to permission pivot, keyed `(model_id, permission_id)`.
    pub fn permissions(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            owner_key: String::from("model_id"),
            related_key: String::from("permission_id"),
        }
    }

    /// Host entity to role pivot, keyed `(model_id, role_id)`.
    pub fn roles(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            owner_key: String::from("model_id"),
            related_key: String::from("role_id"),
        }
    }

    /// Role to permission pivot, keyed `(role_id, permission_id)`.
    pub fn role_permissions(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            owner_key: String::from("role_id"),
            related_key: String::from("permission_id"),
        }
    }
}

/// A backing store for permissions, roles and their grants.
///
/// Stores are cheap handles; cloning one shares the underlying storage.
pub trait Store: Clone + Send + Sync + 'static {
    /// Permission rows.
    type Permissions: Catalog<Permission>;
    /// Role rows.
    type Roles: Catalog<Role>;
    /// Owner to permission relation.
    type PermissionRelation: Relation<Permission>;
    /// Owner to role relation.
    type RoleRelation: RoleRelation;

    /// The permission catalog.
    fn permission_catalog(&self) -> &Self::Permissions;

    /// The role catalog.
    fn role_catalog(&self) -> &Self::Roles;

    /// Permissions granted to `owner` through `pivot`.
    fn permissions_of(&self, pivot: &Pivot, owner: i64) -> Self::PermissionRelation;

    /// Roles assigned to `owner` through `pivot`.
    fn roles_of(&self, pivot: &Pivot, owner: i64) -> Self::RoleRelation;

    /// The role to permission pivot every role shares, fixed when the store
    /// was built.
    fn role_permissions_pivot(&self) -> &Pivot;
}

/// Turn a ref into a row, creating the row when it is only known by name.
pub(crate) async fn resolve<T, C>(catalog: &C, reference: Ref<T>) -> Result<T>
where
    T: Named,
    C: Catalog<T>,
{
    match reference {
        Ref::Entity(entity) => Ok(entity),
        Ref::Name(name) => catalog.first_or_create(&name).await,
    }
}
