//! The PostgreSQL [`Store`].

use std::sync::Arc;

use warden::{
    Permission, Role,
    store::{Pivot, Store},
};
use warden_config::{TableNames, ident::quote};

use crate::{
    auth::{catalog::PgCatalog, relation::PgRelation},
    db::connection::DbConnection,
    prelude::*,
    sql::PivotSql,
};

/// Quoted names of the tables every relation shares.
#[derive(Debug)]
pub(crate) struct QuotedTables {
    pub permissions: String,
    pub roles: String,
    pub role_permissions: PivotSql,
}

/// Permissions, roles and grants kept in PostgreSQL.
///
/// The tables are expected to exist; see [`crate::schema::Schema`].
///
/// ```rust,no_run
/// use std::path::Path;
///
/// use warden::{AuthorizableModel, HasRoles};
/// use warden_config::{DatabaseConfig, WardenConfig};
/// use warden_models::{db::connection::DbConnection, store::PgStore};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let config = WardenConfig::from_file(Path::new("warden.toml"))?;
/// let db = DbConnection::new(&DatabaseConfig::from_env()?)?;
/// let store = PgStore::new(db, &config.tables)?;
/// let users = AuthorizableModel::new(store, config.authorizable("users").ok_or("users aren't configured")?);
/// users.entity(42).assign_role(["writer"]).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PgStore {
    connection: DbConnection,
    tables: Arc<QuotedTables>,
    permissions: PgCatalog<Permission>,
    roles: PgCatalog<Role>,
    role_permissions: Pivot,
}

impl PgStore {
    /// Build a store over `tables`, rejecting names that aren't plain
    /// identifiers.
    pub fn new(connection: DbConnection, tables: &TableNames) -> Result<Self> {
        let role_permissions = Pivot::role_permissions(&tables.role_has_permissions);
        let quoted = QuotedTables {
            permissions: quote(&tables.permissions)?,
            roles: quote(&tables.roles)?,
            role_permissions: PivotSql::new(&role_permissions)?,
        };
        Ok(Self {
            permissions: PgCatalog::new(connection.clone(), quoted.permissions.clone()),
            roles: PgCatalog::new(connection.clone(), quoted.roles.clone()),
            connection,
            tables: Arc::new(quoted),
            role_permissions,
        })
    }

    /// The pool this store runs on.
    pub fn connection(&self) -> &DbConnection {
        &self.connection
    }
}

impl Store for PgStore {
    type Permissions = PgCatalog<Permission>;
    type Roles = PgCatalog<Role>;
    type PermissionRelation = PgRelation<Permission>;
    type RoleRelation = PgRelation<Role>;

    fn permission_catalog(&self) -> &Self::Permissions {
        &self.permissions
    }

    fn role_catalog(&self) -> &Self::Roles {
        &self.roles
    }

    fn permissions_of(&self, pivot: &Pivot, owner: i64) -> Self::PermissionRelation {
        PgRelation::new(
            self.connection.clone(),
            self.tables.clone(),
            pivot,
            self.tables.permissions.clone(),
            owner,
        )
    }

    fn roles_of(&self, pivot: &Pivot, owner: i64) -> Self::RoleRelation {
        PgRelation::new(
            self.connection.clone(),
            self.tables.clone(),
            pivot,
            self.tables.roles.clone(),
            owner,
        )
    }

    fn role_permissions_pivot(&self) -> &Pivot {
        &self.role_permissions
    }
}
