//! Find-or-create access to permission and role rows.

use std::{fmt, marker::PhantomData};

use diesel::{prelude::*, sql_query, sql_types::Text};
use tracing::{debug, warn};
use warden::store::Catalog;

use crate::{auth::row::NamedRow, db::connection::DbConnection, prelude::*, sql};

/// Attempts before find-or-create gives up on a name that keeps vanishing.
const FIND_OR_CREATE_ATTEMPTS: usize = 3;

/// Rows of one named table, permissions or roles.
pub struct PgCatalog<T> {
    connection: DbConnection,
    table: String,
    row: PhantomData<fn() -> T>,
}

impl<T> PgCatalog<T> {
    /// A catalog over `table`, which must already be quoted.
    pub(crate) fn new(connection: DbConnection, table: String) -> Self {
        Self {
            connection,
            table,
            row: PhantomData,
        }
    }
}

impl<T> Clone for PgCatalog<T> {
    fn clone(&self) -> Self {
        Self::new(self.connection.clone(), self.table.clone())
    }
}

impl<T> fmt::Debug for PgCatalog<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgCatalog")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

/// Fetches the row named `name`.
pub(crate) fn find_by_name(
    conn: &mut PgConnection,
    table: &str,
    name: &str,
) -> Result<Option<NamedRow>> {
    Ok(sql_query(sql::find_by_name(table))
        .bind::<Text, _>(name)
        .get_result::<NamedRow>(conn)
        .optional()?)
}

/// Fetches the row named `name`, inserting it when absent.
///
/// The insert leans on the unique `name` constraint: a writer that loses
/// the race gets no row back and reads the winner's row instead.
pub(crate) fn first_or_create(
    conn: &mut PgConnection,
    table: &str,
    name: &str,
) -> Result<NamedRow> {
    for attempt in 1..=FIND_OR_CREATE_ATTEMPTS {
        if let Some(row) = find_by_name(conn, table, name)? {
            return Ok(row);
        }
        let inserted = sql_query(sql::insert_named(table))
            .bind::<Text, _>(name)
            .get_result::<NamedRow>(conn)
            .optional()?;
        if let Some(row) = inserted {
            debug!(table, name, id = row.id, "Created row");
            return Ok(row);
        }
        warn!(table, name, attempt, "Find-or-create lost a race, retrying");
    }
    Err(Error::FindOrCreateConflict {
        table: table.to_string(),
        name: name.to_string(),
    })
}

impl<T> Catalog<T> for PgCatalog<T>
where
    T: From<NamedRow> + Send + 'static,
{
    async fn first_or_create(&self, name: &str) -> warden::prelude::Result<T> {
        let table = self.table.clone();
        let name = name.to_string();
        let row = self
            .connection
            .run(move |conn| first_or_create(conn, &table, &name))
            .await?;
        Ok(row.into())
    }

    async fn find_by_name(&self, name: &str) -> warden::prelude::Result<Option<T>> {
        let table = self.table.clone();
        let name = name.to_string();
        let row = self
            .connection
            .run(move |conn| find_by_name(conn, &table, &name))
            .await?;
        Ok(row.map(Into::into))
    }

    async fn all(&self) -> warden::prelude::Result<Vec<T>> {
        let query = sql::select_all(&self.table);
        let rows = self
            .connection
            .run(move |conn| Ok(sql_query(query).load::<NamedRow>(conn)?))
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
