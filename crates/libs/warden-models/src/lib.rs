//! PostgreSQL storage for the warden RBAC layer.
//!
//! [`store::PgStore`] implements [`warden::store::Store`] over diesel and an
//! r2d2 pool. Table names come from [`warden_config::TableNames`] and the
//! host entities' [`warden_config::AuthorizableConfig`]; [`schema::Schema`]
//! creates them.
//!
//! # Usage
//!
//! ```rust,no_run
//! use warden::{AuthorizableModel, Authorizable, HasPermissions};
//! use warden_config::{AuthorizableConfig, DatabaseConfig, TableNames};
//! use warden_models::{db::connection::DbConnection, schema::Schema, store::PgStore};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let db = DbConnection::new(&DatabaseConfig::from_env()?)?;
//! let tables = TableNames::default();
//! let users = AuthorizableConfig::new("user_has_permissions", "user_has_roles");
//!
//! let schema = Schema::new(&tables)?;
//! schema.install(&db).await?;
//! schema.install_pivots(&db, &users, Some("users")).await?;
//!
//! let users = AuthorizableModel::new(PgStore::new(db, &tables)?, &users);
//! users.entity(7).give_permission_to(["edit articles"]).await?;
//! assert!(users.entity(7).has_direct_permission("edit articles").await?);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod db;
pub mod error;
pub mod prelude;
pub mod schema;
mod sql;
pub mod store;

pub use store::PgStore;
