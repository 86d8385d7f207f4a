//! Grants of one owner row over one pivot table.

use std::{collections::HashMap, fmt, marker::PhantomData, sync::Arc};

use diesel::{
    prelude::*,
    sql_query,
    sql_types::{Array, BigInt, Text},
};
use tracing::debug;
use warden::{
    Permission, Role, RoleWithPermissions,
    store::{Pivot, Relation, RoleRelation},
};

use crate::{
    auth::row::{Found, NameRow, NamedRow, OwnedRow},
    db::connection::DbConnection,
    prelude::*,
    sql::{self, PivotSql},
    store::QuotedTables,
};

/// Related rows of `owner` through `pivot`.
pub struct PgRelation<T> {
    connection: DbConnection,
    tables: Arc<QuotedTables>,
    pivot: Pivot,
    related: String,
    owner: i64,
    row: PhantomData<fn() -> T>,
}

impl<T> PgRelation<T> {
    /// `related` is the quoted table the pivot's related key points at.
    pub(crate) fn new(
        connection: DbConnection,
        tables: Arc<QuotedTables>,
        pivot: &Pivot,
        related: String,
        owner: i64,
    ) -> Self {
        Self {
            connection,
            tables,
            pivot: pivot.clone(),
            related,
            owner,
            row: PhantomData,
        }
    }

    /// Run `f` with the pivot quoted, the related table and the owner ID.
    async fn run<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut PgConnection, &PivotSql, &str, i64) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let pivot = PivotSql::new(&self.pivot)?;
        let related = self.related.clone();
        let owner = self.owner;
        self.connection
            .run(move |conn| f(conn, &pivot, &related, owner))
            .await
    }
}

impl<T> fmt::Debug for PgRelation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgRelation")
            .field("pivot", &self.pivot.table)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

fn attach(conn: &mut PgConnection, pivot: &PivotSql, owner: i64, ids: &[i64]) -> Result<usize> {
    Ok(sql_query(sql::attach(pivot))
        .bind::<BigInt, _>(owner)
        .bind::<Array<BigInt>, _>(ids)
        .execute(conn)?)
}

impl<T> Relation<T> for PgRelation<T>
where
    T: From<NamedRow> + Send + 'static,
{
    async fn exists(&self, name: &str) -> warden::prelude::Result<bool> {
        let name = name.to_string();
        let found = self
            .run(move |conn, pivot, related, owner| {
                Ok(sql_query(sql::related_exists(pivot, related))
                    .bind::<BigInt, _>(owner)
                    .bind::<Text, _>(name)
                    .get_result::<Found>(conn)?)
            })
            .await?;
        Ok(found.found)
    }

    async fn load(&self) -> warden::prelude::Result<Vec<T>> {
        let rows = self
            .run(|conn, pivot, related, owner| {
                Ok(sql_query(sql::related_rows(pivot, related))
                    .bind::<BigInt, _>(owner)
                    .load::<NamedRow>(conn)?)
            })
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn names(&self) -> warden::prelude::Result<Vec<String>> {
        let rows = self
            .run(|conn, pivot, related, owner| {
                Ok(sql_query(sql::related_names(pivot, related))
                    .bind::<BigInt, _>(owner)
                    .load::<NameRow>(conn)?)
            })
            .await?;
        Ok(rows.into_iter().map(|row| row.name).collect())
    }

    async fn attach(&self, ids: &[i64]) -> warden::prelude::Result<()> {
        let ids = ids.to_vec();
        let inserted = self
            .run(move |conn, pivot, _, owner| attach(conn, pivot, owner, &ids))
            .await?;
        debug!(pivot = %self.pivot.table, owner = self.owner, inserted, "Attached");
        Ok(())
    }

    async fn detach(&self, ids: &[i64]) -> warden::prelude::Result<()> {
        let ids = ids.to_vec();
        let deleted = self
            .run(move |conn, pivot, _, owner| {
                Ok(sql_query(sql::detach(pivot))
                    .bind::<BigInt, _>(owner)
                    .bind::<Array<BigInt>, _>(ids)
                    .execute(conn)?)
            })
            .await?;
        debug!(pivot = %self.pivot.table, owner = self.owner, deleted, "Detached");
        Ok(())
    }

    async fn sync(&self, ids: &[i64]) -> warden::prelude::Result<()> {
        let ids = ids.to_vec();
        self.run(move |conn, pivot, _, owner| {
            conn.transaction(|conn| {
                sql_query(sql::detach_others(pivot))
                    .bind::<BigInt, _>(owner)
                    .bind::<Array<BigInt>, _>(&ids)
                    .execute(conn)?;
                attach(conn, pivot, owner, &ids)
            })
        })
        .await?;
        debug!(pivot = %self.pivot.table, owner = self.owner, "Synced");
        Ok(())
    }
}

impl RoleRelation for PgRelation<Role> {
    async fn exists_with_permission(&self, permission: &str) -> warden::prelude::Result<bool> {
        let tables = self.tables.clone();
        let permission = permission.to_string();
        let found = self
            .run(move |conn, roles, _, owner| {
                let query = sql::role_permission_exists(
                    roles,
                    &tables.role_permissions,
                    &tables.permissions,
                );
                Ok(sql_query(query)
                    .bind::<BigInt, _>(owner)
                    .bind::<Text, _>(permission)
                    .get_result::<Found>(conn)?)
            })
            .await?;
        Ok(found.found)
    }

    async fn load_with_permissions(&self) -> warden::prelude::Result<Vec<RoleWithPermissions>> {
        let tables = self.tables.clone();
        let (roles, granted) = self
            .run(move |conn, pivot, related, owner| {
                let roles = sql_query(sql::related_rows(pivot, related))
                    .bind::<BigInt, _>(owner)
                    .load::<NamedRow>(conn)?;
                if roles.is_empty() {
                    return Ok((roles, Vec::new()));
                }
                let ids: Vec<i64> = roles.iter().map(|role| role.id).collect();
                let query = sql::permissions_of_roles(&tables.role_permissions, &tables.permissions);
                let granted = sql_query(query)
                    .bind::<Array<BigInt>, _>(ids)
                    .load::<OwnedRow>(conn)?;
                Ok((roles, granted))
            })
            .await?;

        let mut by_role: HashMap<i64, Vec<Permission>> = HashMap::new();
        for granted in granted {
            by_role
                .entry(granted.owner_id)
                .or_default()
                .push(granted.row.into());
        }
        Ok(roles
            .into_iter()
            .map(|role| RoleWithPermissions {
                permissions: by_role.remove(&role.id).unwrap_or_default(),
                role: role.into(),
            })
            .collect())
    }
}
