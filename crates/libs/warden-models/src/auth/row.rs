//! Query result shapes.

use chrono::{DateTime, Utc};
use diesel::{
    QueryableByName,
    sql_types::{BigInt, Bool, Text, Timestamptz},
};
use warden::{Permission, Role};

/// A permission or role row.
#[derive(Debug, Clone, PartialEq, Eq, QueryableByName)]
pub struct NamedRow {
    /// Row ID.
    #[diesel(sql_type = BigInt)]
    pub id: i64,
    /// Unique name.
    #[diesel(sql_type = Text)]
    pub name: String,
    /// Creation time.
    #[diesel(sql_type = Timestamptz)]
    pub created_at: DateTime<Utc>,
    /// Last update time.
    #[diesel(sql_type = Timestamptz)]
    pub updated_at: DateTime<Utc>,
}

impl From<NamedRow> for Permission {
    fn from(value: NamedRow) -> Self {
        Permission {
            id: value.id,
            name: value.name,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<NamedRow> for Role {
    fn from(value: NamedRow) -> Self {
        Role {
            id: value.id,
            name: value.name,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// A row tagged with the pivot owner it was loaded for.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct OwnedRow {
    #[diesel(sql_type = BigInt)]
    pub owner_id: i64,
    #[diesel(embed)]
    pub row: NamedRow,
}

#[derive(Debug, QueryableByName)]
pub(crate) struct NameRow {
    #[diesel(sql_type = Text)]
    pub name: String,
}

#[derive(Debug, QueryableByName)]
pub(crate) struct Found {
    #[diesel(sql_type = Bool)]
    pub found: bool,
}
