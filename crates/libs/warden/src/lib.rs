//! Role and permission capabilities for persistent host entities.
//!
//! A host entity (a user, a team, an API client) gains direct permission
//! grants through [`HasPermissions`], role membership through [`HasRoles`],
//! and the combined queries of [`Authorizable`]. Roles themselves carry
//! permissions through the same [`HasPermissions`] capability, one level
//! deep.
//!
//! Storage is abstracted behind [`store::Store`]; `warden-models` provides
//! the PostgreSQL implementation and [`memory::MemoryStore`] an in-process
//! one.
//!
//! # Usage
//!
//! ```rust
//! use warden::{Authorizable, AuthorizableModel, GrantablePermissions, HasPermissions, HasRoles};
//! use warden::memory::MemoryStore;
//! use warden::store::{Catalog, Store};
//! use warden_config::AuthorizableConfig;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let store = MemoryStore::default();
//! let users = AuthorizableModel::new(store.clone(), &AuthorizableConfig::default());
//! let roles = GrantablePermissions::for_roles(store.clone());
//!
//! let editor = store.role_catalog().first_or_create("editor").await?;
//! roles.entity(editor.id).give_permission_to(["publish"]).await?;
//!
//! let alice = users.entity(1);
//! alice.give_permission_to(["edit"]).await?;
//! alice.assign_role([&editor]).await?;
//!
//! assert!(alice.has_direct_permission("edit").await?);
//! assert!(alice.has_permission_via_role("publish").await?);
//! assert_eq!(alice.get_all_permissions().await?.len(), 2);
//! # Ok::<(), warden::Error>(())
//! # }).unwrap();
//! ```

pub mod authorizable;
pub mod entity;
pub mod error;
pub mod memory;
pub mod permissions;
pub mod prelude;
pub mod roles;
pub mod store;

pub use authorizable::{Authorizable, AuthorizableEntity, AuthorizableModel};
pub use entity::{Permission, PermissionRef, Ref, Role, RoleRef, RoleWithPermissions};
pub use error::Error;
pub use permissions::{GrantablePermissions, HasPermissions, PermissionHolder};
pub use roles::{GrantableRoles, HasRoles, RoleHolder};
