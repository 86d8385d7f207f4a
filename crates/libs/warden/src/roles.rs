//! Role assignment.
//!
//! Mirrors [`crate::permissions`] for roles. The multi-role checks load the
//! relation once and compare names in memory instead of issuing one query per
//! candidate, and there is no failing `check` variant.

use std::{fmt, future::Future};

use futures::future::try_join_all;
use tracing::debug;

use crate::{
    entity::{Role, RoleRef},
    prelude::*,
    store::{Catalog, Pivot, Relation, RoleRelation, Store, resolve},
};

/// Role checks and mutations for an entity.
pub trait HasRoles: Send + Sync {
    /// Where roles are resolved by name.
    type RoleCatalog: Catalog<Role>;
    /// The entity's role relation.
    type Roles: RoleRelation;

    /// The role catalog.
    fn role_catalog(&self) -> &Self::RoleCatalog;

    /// The entity's role relation.
    fn roles(&self) -> &Self::Roles;

    /// Assign each role in turn, creating unknown names. Assigning a role
    /// twice leaves a single assignment.
    fn assign_role<I>(&self, roles: I) -> impl Future<Output = Result<()>> + Send
    where
        I: IntoIterator,
        I::Item: Into<RoleRef>,
    {
        let roles: Vec<RoleRef> = roles.into_iter().map(Into::into).collect();
        async move {
            for role in roles {
                let role = resolve(self.role_catalog(), role).await?;
                debug!(role = %role.name, "Assigning role");
                self.roles().attach(&[role.id]).await?;
            }
            Ok(())
        }
    }

    /// Replace the assigned set with exactly these roles.
    fn sync_roles<I>(&self, roles: I) -> impl Future<Output = Result<()>> + Send
    where
        I: IntoIterator,
        I::Item: Into<RoleRef>,
    {
        let roles: Vec<RoleRef> = roles.into_iter().map(Into::into).collect();
        async move {
            let catalog = self.role_catalog();
            let resolved =
                try_join_all(roles.into_iter().map(|role| resolve(catalog, role))).await?;
            let ids: Vec<i64> = resolved.iter().map(|role| role.id).collect();
            debug!(count = ids.len(), "Syncing roles");
            self.roles().sync(&ids).await
        }
    }

    /// Remove the assignment if present. Unknown names are created first.
    fn revoke_role(&self, role: impl Into<RoleRef>) -> impl Future<Output = Result<()>> + Send {
        let role = role.into();
        async move {
            let role = resolve(self.role_catalog(), role).await?;
            debug!(role = %role.name, "Revoking role");
            self.roles().detach(&[role.id]).await
        }
    }

    /// Whether the role is assigned. One existence query.
    fn has_role(&self, role: impl Into<RoleRef>) -> impl Future<Output = Result<bool>> + Send {
        let role = role.into();
        async move { self.roles().exists(role.name()).await }
    }

    /// Whether at least one of the roles is assigned. An empty list is
    /// `false`.
    fn has_any_roles<I>(&self, roles: I) -> impl Future<Output = Result<bool>> + Send
    where
        I: IntoIterator,
        I::Item: Into<RoleRef>,
    {
        let wanted: Vec<RoleRef> = roles.into_iter().map(Into::into).collect();
        async move {
            let assigned = self.roles().load().await?;
            Ok(wanted
                .iter()
                .any(|role| assigned.iter().any(|a| a.name == role.name())))
        }
    }

    /// Whether every one of the roles is assigned. An empty list is `true`.
    fn has_all_roles<I>(&self, roles: I) -> impl Future<Output = Result<bool>> + Send
    where
        I: IntoIterator,
        I::Item: Into<RoleRef>,
    {
        let wanted: Vec<RoleRef> = roles.into_iter().map(Into::into).collect();
        async move {
            let assigned = self.roles().load().await?;
            Ok(wanted
                .iter()
                .all(|role| assigned.iter().any(|a| a.name == role.name())))
        }
    }

    /// Names of the assigned roles, in role ID order.
    fn get_role_names(&self) -> impl Future<Output = Result<Vec<String>>> + Send {
        async move { self.roles().names().await }
    }
}

/// The role capability for one kind of entity.
#[derive(Debug, Clone)]
pub struct GrantableRoles<S: Store> {
    store: S,
    pivot: Pivot,
}

impl<S: Store> GrantableRoles<S> {
    /// Roles assigned to host entities through `pivot_table`.
    pub fn new(store: S, pivot_table: impl Into<String>) -> Self {
        Self {
            store,
            pivot: Pivot::roles(pivot_table),
        }
    }

    /// The pivot assignments are stored in.
    pub fn pivot(&self) -> &Pivot {
        &self.pivot
    }

    /// Bind the capability to the entity with primary key `key`.
    pub fn entity(&self, key: i64) -> RoleHolder<S> {
        RoleHolder {
            key,
            roles: self.store.roles_of(&self.pivot, key),
            store: self.store.clone(),
        }
    }
}

/// One entity with the role capability.
pub struct RoleHolder<S: Store> {
    key: i64,
    store: S,
    roles: S::RoleRelation,
}

impl<S: Store> RoleHolder<S> {
    /// Primary key of the entity.
    pub fn key(&self) -> i64 {
        self.key
    }
}

impl<S: Store> fmt::Debug for RoleHolder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoleHolder")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl<S: Store> HasRoles for RoleHolder<S> {
    type RoleCatalog = S::Roles;
    type Roles = S::RoleRelation;

    fn role_catalog(&self) -> &Self::RoleCatalog {
        self.store.role_catalog()
    }

    fn roles(&self) -> &Self::Roles {
        &self.roles
    }
}
