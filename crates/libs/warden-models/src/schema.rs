//! Runtime DDL for the configured tables.
//!
//! Table names come from configuration, so the tables are created from
//! their configured names instead of fixed migrations. Every statement is
//! idempotent.

use diesel::connection::SimpleConnection;
use tracing::info;
use warden::store::Pivot;
use warden_config::{AuthorizableConfig, TableNames, ident::quote};

use crate::{db::connection::DbConnection, prelude::*, sql::PivotSql};

/// Creates and drops the permission, role and pivot tables.
#[derive(Debug, Clone)]
pub struct Schema {
    permissions: String,
    roles: String,
    role_permissions: PivotSql,
}

fn named_table(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\
         id BIGSERIAL PRIMARY KEY, \
         name VARCHAR(255) NOT NULL UNIQUE, \
         created_at TIMESTAMPTZ NOT NULL DEFAULT now(), \
         updated_at TIMESTAMPTZ NOT NULL DEFAULT now())"
    )
}

/// A pivot whose related key cascades from `related`. The owner key is only
/// constrained to the owner table when one is given.
fn pivot_table(pivot: &PivotSql, related: &str, owner: Option<&str>) -> String {
    let owner_ref = owner
        .map(|owner| format!(" REFERENCES {owner} (id) ON DELETE CASCADE"))
        .unwrap_or_default();
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\
         {owner_key} BIGINT NOT NULL{owner_ref}, \
         {related_key} BIGINT NOT NULL REFERENCES {related} (id) ON DELETE CASCADE, \
         PRIMARY KEY ({owner_key}, {related_key}))",
        table = pivot.table,
        owner_key = pivot.owner,
        related_key = pivot.related,
    )
}

fn drop_table(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {table}")
}

impl Schema {
    /// Schema for `tables`, rejecting names that aren't plain identifiers.
    pub fn new(tables: &TableNames) -> Result<Self> {
        Ok(Self {
            permissions: quote(&tables.permissions)?,
            roles: quote(&tables.roles)?,
            role_permissions: PivotSql::new(&Pivot::role_permissions(
                &tables.role_has_permissions,
            ))?,
        })
    }

    /// Create the permissions, roles and role to permission tables.
    pub async fn install(&self, connection: &DbConnection) -> Result<()> {
        let ddl = [
            named_table(&self.permissions),
            named_table(&self.roles),
            pivot_table(
                &self.role_permissions,
                &self.permissions,
                Some(&self.roles),
            ),
        ]
        .join(";\n");
        info!(
            permissions = %self.permissions,
            roles = %self.roles,
            "Installing authorization tables"
        );
        connection
            .run(move |conn| Ok(conn.batch_execute(&ddl)?))
            .await
    }

    /// Create the two pivot tables of one host entity.
    ///
    /// With `host_table` set, pivot owners must be rows of that table and
    /// their grants go away with them.
    pub async fn install_pivots(
        &self,
        connection: &DbConnection,
        config: &AuthorizableConfig,
        host_table: Option<&str>,
    ) -> Result<()> {
        let host = host_table.map(quote).transpose()?;
        let (permissions, roles) = pivots(config)?;
        let ddl = [
            pivot_table(&permissions, &self.permissions, host.as_deref()),
            pivot_table(&roles, &self.roles, host.as_deref()),
        ]
        .join(";\n");
        info!(
            permissions = %permissions.table,
            roles = %roles.table,
            "Installing pivot tables"
        );
        connection
            .run(move |conn| Ok(conn.batch_execute(&ddl)?))
            .await
    }

    /// Drop the two pivot tables of one host entity.
    pub async fn drop_pivots(
        &self,
        connection: &DbConnection,
        config: &AuthorizableConfig,
    ) -> Result<()> {
        let (permissions, roles) = pivots(config)?;
        let ddl = [drop_table(&permissions.table), drop_table(&roles.table)].join(";\n");
        info!(
            permissions = %permissions.table,
            roles = %roles.table,
            "Dropping pivot tables"
        );
        connection
            .run(move |conn| Ok(conn.batch_execute(&ddl)?))
            .await
    }

    /// Drop the role to permission pivot and both row tables.
    ///
    /// Host pivots reference the row tables and must be dropped first.
    pub async fn drop_all(&self, connection: &DbConnection) -> Result<()> {
        let ddl = [
            drop_table(&self.role_permissions.table),
            drop_table(&self.roles),
            drop_table(&self.permissions),
        ]
        .join(";\n");
        info!("Dropping authorization tables");
        connection
            .run(move |conn| Ok(conn.batch_execute(&ddl)?))
            .await
    }
}

fn pivots(config: &AuthorizableConfig) -> Result<(PivotSql, PivotSql)> {
    Ok((
        PivotSql::new(&Pivot::permissions(&config.permissions_pivot_table))?,
        PivotSql::new(&Pivot::roles(&config.roles_pivot_table))?,
    ))
}
