//! Configuration for the warden RBAC layer.
//!
//! Holds the table names the permission and role rows live in, the pivot
//! tables each authorizable host entity uses, and the database location.
//!
//! # Usage
//!
//! ```rust
//! use warden_config::WardenConfig;
//!
//! let config = WardenConfig::from_toml(
//!     r#"
//!     [tables]
//!     permissions = "acl_permissions"
//!
//!     [authorizables.user]
//!     permissions_pivot_table = "user_has_permissions"
//!     roles_pivot_table = "user_has_roles"
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.tables.permissions, "acl_permissions");
//! assert_eq!(config.tables.roles, "roles");
//! ```

pub mod database;
pub mod error;
pub mod ident;
pub mod prelude;
pub mod tables;
pub mod warden_config;

pub use database::DatabaseConfig;
pub use tables::{AuthorizableConfig, TableNames};
pub use warden_config::WardenConfig;
