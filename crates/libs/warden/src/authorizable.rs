//! Roles over permissions on the same entity, plus the queries that need
//! both.

use std::{fmt, future::Future};

use warden_config::AuthorizableConfig;

use crate::{
    entity::{Permission, PermissionRef},
    permissions::{GrantablePermissions, HasPermissions, PermissionHolder},
    prelude::*,
    roles::{GrantableRoles, HasRoles, RoleHolder},
    store::{Relation, RoleRelation, Store},
};

/// Queries combining an entity's direct permissions with those it holds
/// through its roles. Implemented for everything that has both capabilities.
pub trait Authorizable: HasPermissions + HasRoles {
    /// Whether the permission is granted directly, ignoring roles.
    fn has_direct_permission(
        &self,
        permission: impl Into<PermissionRef>,
    ) -> impl Future<Output = Result<bool>> + Send {
        self.has_permission_to(permission)
    }

    /// Whether any assigned role carries the permission. One query; direct
    /// grants are not considered.
    fn has_permission_via_role(
        &self,
        permission: impl Into<PermissionRef>,
    ) -> impl Future<Output = Result<bool>> + Send {
        let permission = permission.into();
        async move { self.roles().exists_with_permission(permission.name()).await }
    }

    /// The entity's own permissions.
    fn get_direct_permissions(&self) -> impl Future<Output = Result<Vec<Permission>>> + Send {
        async move { self.permissions().load().await }
    }

    /// Permissions of every assigned role, flattened role by role. A
    /// permission shared by several roles appears once per role.
    fn get_permissions_via_roles(&self) -> impl Future<Output = Result<Vec<Permission>>> + Send {
        async move {
            let roles = self.roles().load_with_permissions().await?;
            Ok(roles
                .into_iter()
                .flat_map(|role| role.permissions)
                .collect())
        }
    }

    /// Direct permissions followed by role permissions, without
    /// deduplication. Both sides are loaded together.
    fn get_all_permissions(&self) -> impl Future<Output = Result<Vec<Permission>>> + Send {
        async move {
            let (mut direct, roles) = futures::try_join!(
                self.permissions().load(),
                self.roles().load_with_permissions()
            )?;
            direct.extend(roles.into_iter().flat_map(|role| role.permissions));
            Ok(direct)
        }
    }
}

impl<T: HasPermissions + HasRoles> Authorizable for T {}

/// The authorizable capability for one kind of host entity.
#[derive(Debug, Clone)]
pub struct AuthorizableModel<S: Store> {
    permissions: GrantablePermissions<S>,
    roles: GrantableRoles<S>,
}

impl<S: Store> AuthorizableModel<S> {
    /// Compose both capabilities over the pivots named in `config`.
    ///
    /// ```rust
    /// use warden::{AuthorizableModel, memory::MemoryStore};
    /// use warden_config::AuthorizableConfig;
    ///
    /// let users = AuthorizableModel::new(MemoryStore::default(), &AuthorizableConfig::default());
    /// let alice = users.entity(1);
    /// assert_eq!(alice.key(), 1);
    /// ```
    pub fn new(store: S, config: &AuthorizableConfig) -> Self {
        Self {
            permissions: GrantablePermissions::new(store.clone(), &config.permissions_pivot_table),
            roles: GrantableRoles::new(store, &config.roles_pivot_table),
        }
    }

    /// The permission half.
    pub fn permissions(&self) -> &GrantablePermissions<S> {
        &self.permissions
    }

    /// The role half.
    pub fn roles(&self) -> &GrantableRoles<S> {
        &self.roles
    }

    /// Bind the capability to the entity with primary key `key`.
    pub fn entity(&self, key: i64) -> AuthorizableEntity<S> {
        AuthorizableEntity {
            permissions: self.permissions.entity(key),
            roles: self.roles.entity(key),
        }
    }
}

/// One authorizable host entity.
pub struct AuthorizableEntity<S: Store> {
    permissions: PermissionHolder<S>,
    roles: RoleHolder<S>,
}

impl<S: Store> AuthorizableEntity<S> {
    /// Primary key of the entity.
    pub fn key(&self) -> i64 {
        self.permissions.key()
    }
}

impl<S: Store> fmt::Debug for AuthorizableEntity<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizableEntity")
            .field("key", &self.key())
            .finish_non_exhaustive()
    }
}

impl<S: Store> HasPermissions for AuthorizableEntity<S> {
    type PermissionCatalog = S::Permissions;
    type Permissions = S::PermissionRelation;

    fn permission_catalog(&self) -> &Self::PermissionCatalog {
        self.permissions.permission_catalog()
    }

    fn permissions(&self) -> &Self::Permissions {
        self.permissions.permissions()
    }
}

impl<S: Store> HasRoles for AuthorizableEntity<S> {
    type RoleCatalog = S::Roles;
    type Roles = S::RoleRelation;

    fn role_catalog(&self) -> &Self::RoleCatalog {
        self.roles.role_catalog()
    }

    fn roles(&self) -> &Self::Roles {
        self.roles.roles()
    }
}
