//! Direct permission grants.
//!
//! [`HasPermissions`] gives any entity with a permission relation the full
//! set of permission checks and mutations. [`GrantablePermissions`] binds a
//! store and a pivot table, and hands out [`PermissionHolder`]s per entity.

use std::{fmt, future::Future};

use futures::future::try_join_all;
use tracing::debug;

use crate::{
    entity::{Permission, PermissionRef},
    prelude::*,
    store::{Catalog, Pivot, Relation, Store, resolve},
};

/// Permission checks and mutations for an entity.
pub trait HasPermissions: Send + Sync {
    /// Where permissions are resolved by name.
    type PermissionCatalog: Catalog<Permission>;
    /// The entity's own permission relation.
    type Permissions: Relation<Permission>;

    /// The permission catalog.
    fn permission_catalog(&self) -> &Self::PermissionCatalog;

    /// The entity's permission relation.
    fn permissions(&self) -> &Self::Permissions;

    /// Whether the permission is granted to this entity. One existence query,
    /// nothing has to be loaded first.
    fn has_permission_to(
        &self,
        permission: impl Into<PermissionRef>,
    ) -> impl Future<Output = Result<bool>> + Send {
        let permission = permission.into();
        async move { self.permissions().exists(permission.name()).await }
    }

    /// Like [`HasPermissions::has_permission_to`] but fails with
    /// [`Error::Unauthorized`] instead of returning `false`.
    fn check_permission_to(
        &self,
        permission: impl Into<PermissionRef>,
    ) -> impl Future<Output = Result<bool>> + Send {
        let permission = permission.into();
        async move {
            if self.permissions().exists(permission.name()).await? {
                return Ok(true);
            }
            debug!(permission = permission.name(), "Permission check failed");
            Err(Error::Unauthorized {
                permission: permission.name().to_string(),
            })
        }
    }

    /// Whether at least one of the permissions is granted. Loads the
    /// relation once; an empty list is `false`.
    fn has_any_permission<I>(&self, permissions: I) -> impl Future<Output = Result<bool>> + Send
    where
        I: IntoIterator,
        I::Item: Into<PermissionRef>,
    {
        let wanted: Vec<PermissionRef> = permissions.into_iter().map(Into::into).collect();
        async move {
            let granted = self.permissions().load().await?;
            Ok(wanted
                .iter()
                .any(|permission| granted.iter().any(|g| g.name == permission.name())))
        }
    }

    /// Whether every one of the permissions is granted. Loads the relation
    /// once; an empty list is `true`.
    fn has_all_permissions<I>(&self, permissions: I) -> impl Future<Output = Result<bool>> + Send
    where
        I: IntoIterator,
        I::Item: Into<PermissionRef>,
    {
        let wanted: Vec<PermissionRef> = permissions.into_iter().map(Into::into).collect();
        async move {
            let granted = self.permissions().load().await?;
            Ok(wanted
                .iter()
                .all(|permission| granted.iter().any(|g| g.name == permission.name())))
        }
    }

    /// Grant each permission in turn, creating unknown names. Granting an
    /// already granted permission changes nothing.
    fn give_permission_to<I>(&self, permissions: I) -> impl Future<Output = Result<()>> + Send
    where
        I: IntoIterator,
        I::Item: Into<PermissionRef>,
    {
        let permissions: Vec<PermissionRef> = permissions.into_iter().map(Into::into).collect();
        async move {
            for permission in permissions {
                let permission = resolve(self.permission_catalog(), permission).await?;
                debug!(permission = %permission.name, "Granting permission");
                self.permissions().attach(&[permission.id]).await?;
            }
            Ok(())
        }
    }

    /// Replace the granted set with exactly these permissions. Names are
    /// resolved concurrently, then the relation is synced in one step.
    fn sync_permissions<I>(&self, permissions: I) -> impl Future<Output = Result<()>> + Send
    where
        I: IntoIterator,
        I::Item: Into<PermissionRef>,
    {
        let permissions: Vec<PermissionRef> = permissions.into_iter().map(Into::into).collect();
        async move {
            let catalog = self.permission_catalog();
            let resolved = try_join_all(
                permissions
                    .into_iter()
                    .map(|permission| resolve(catalog, permission)),
            )
            .await?;
            let ids: Vec<i64> = resolved.iter().map(|permission| permission.id).collect();
            debug!(count = ids.len(), "Syncing permissions");
            self.permissions().sync(&ids).await
        }
    }

    /// Remove the grant if present.
    ///
    /// A name that does not exist yet is created before the (necessarily
    /// empty) detach.
    fn revoke_permission_to(
        &self,
        permission: impl Into<PermissionRef>,
    ) -> impl Future<Output = Result<()>> + Send {
        let permission = permission.into();
        async move {
            let permission = resolve(self.permission_catalog(), permission).await?;
            debug!(permission = %permission.name, "Revoking permission");
            self.permissions().detach(&[permission.id]).await
        }
    }

    /// Names of the granted permissions, in permission ID order.
    fn get_permission_names(&self) -> impl Future<Output = Result<Vec<String>>> + Send {
        async move { self.permissions().names().await }
    }
}

/// The permission capability for one kind of entity: a store plus the pivot
/// table that entity's grants live in.
#[derive(Debug, Clone)]
pub struct GrantablePermissions<S: Store> {
    store: S,
    pivot: Pivot,
}

impl<S: Store> GrantablePermissions<S> {
    /// Permissions granted to host entities through `pivot_table`.
    pub fn new(store: S, pivot_table: impl Into<String>) -> Self {
        Self {
            store,
            pivot: Pivot::permissions(pivot_table),
        }
    }

    /// Permissions granted to roles, through the store's role pivot.
    pub fn for_roles(store: S) -> Self {
        let pivot = store.role_permissions_pivot().clone();
        Self { store, pivot }
    }

    /// The pivot grants are stored in.
    pub fn pivot(&self) -> &Pivot {
        &self.pivot
    }

    /// Bind the capability to the entity with primary key `key`.
    pub fn entity(&self, key: i64) -> PermissionHolder<S> {
        PermissionHolder {
            key,
            permissions: self.store.permissions_of(&self.pivot, key),
            store: self.store.clone(),
        }
    }
}

/// One entity with the permission capability.
pub struct PermissionHolder<S: Store> {
    key: i64,
    store: S,
    permissions: S::PermissionRelation,
}

impl<S: Store> PermissionHolder<S> {
    /// Primary key of the entity.
    pub fn key(&self) -> i64 {
        self.key
    }
}

impl<S: Store> fmt::Debug for PermissionHolder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionHolder")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl<S: Store> HasPermissions for PermissionHolder<S> {
    type PermissionCatalog = S::Permissions;
    type Permissions = S::PermissionRelation;

    fn permission_catalog(&self) -> &Self::PermissionCatalog {
        self.store.permission_catalog()
    }

    fn permissions(&self) -> &Self::Permissions {
        &self.permissions
    }
}
