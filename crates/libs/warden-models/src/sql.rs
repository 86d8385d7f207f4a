//! SQL text for the configurable tables.
//!
//! Table names are only known at runtime, so the queries are assembled as
//! text around quoted identifiers; every value travels as a bind parameter.

use warden::store::Pivot;
use warden_config::ident::quote;

use crate::prelude::*;

const NAMED_COLUMNS: &str = "id, name, created_at, updated_at";

/// A pivot with every identifier validated and quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PivotSql {
    pub table: String,
    pub owner: String,
    pub related: String,
}

impl PivotSql {
    pub fn new(pivot: &Pivot) -> Result<Self> {
        Ok(Self {
            table: quote(&pivot.table)?,
            owner: quote(&pivot.owner_key)?,
            related: quote(&pivot.related_key)?,
        })
    }
}

pub(crate) fn find_by_name(table: &str) -> String {
    format!("SELECT {NAMED_COLUMNS} FROM {table} WHERE name = $1")
}

/// Insert that yields no row when a concurrent writer got there first.
pub(crate) fn insert_named(table: &str) -> String {
    format!(
        "INSERT INTO {table} (name, created_at, updated_at) VALUES ($1, now(), now()) \
         ON CONFLICT (name) DO NOTHING RETURNING {NAMED_COLUMNS}"
    )
}

pub(crate) fn select_all(table: &str) -> String {
    format!("SELECT {NAMED_COLUMNS} FROM {table} ORDER BY id")
}

pub(crate) fn related_exists(pivot: &PivotSql, related: &str) -> String {
    format!(
        "SELECT EXISTS (SELECT 1 FROM {} AS pv JOIN {related} AS r ON r.id = pv.{} \
         WHERE pv.{} = $1 AND r.name = $2) AS found",
        pivot.table, pivot.related, pivot.owner
    )
}

pub(crate) fn related_rows(pivot: &PivotSql, related: &str) -> String {
    format!(
        "SELECT r.id, r.name, r.created_at, r.updated_at FROM {} AS pv \
         JOIN {related} AS r ON r.id = pv.{} WHERE pv.{} = $1 ORDER BY r.id",
        pivot.table, pivot.related, pivot.owner
    )
}

pub(crate) fn related_names(pivot: &PivotSql, related: &str) -> String {
    format!(
        "SELECT r.name FROM {} AS pv JOIN {related} AS r ON r.id = pv.{} \
         WHERE pv.{} = $1 ORDER BY r.id",
        pivot.table, pivot.related, pivot.owner
    )
}

pub(crate) fn attach(pivot: &PivotSql) -> String {
    format!(
        "INSERT INTO {} ({}, {}) SELECT $1, unnest($2::bigint[]) ON CONFLICT DO NOTHING",
        pivot.table, pivot.owner, pivot.related
    )
}

pub(crate) fn detach(pivot: &PivotSql) -> String {
    format!(
        "DELETE FROM {} WHERE {} = $1 AND {} = ANY($2)",
        pivot.table, pivot.owner, pivot.related
    )
}

/// Removes every grant of the owner outside the given set.
pub(crate) fn detach_others(pivot: &PivotSql) -> String {
    format!(
        "DELETE FROM {} WHERE {} = $1 AND NOT ({} = ANY($2))",
        pivot.table, pivot.owner, pivot.related
    )
}

/// Whether any role assigned through `roles` holds the named permission.
pub(crate) fn role_permission_exists(
    roles: &PivotSql,
    role_permissions: &PivotSql,
    permissions: &str,
) -> String {
    format!(
        "SELECT EXISTS (SELECT 1 FROM {} AS mr \
         JOIN {} AS rp ON rp.{} = mr.{} \
         JOIN {permissions} AS p ON p.id = rp.{} \
         WHERE mr.{} = $1 AND p.name = $2) AS found",
        roles.table,
        role_permissions.table,
        role_permissions.owner,
        roles.related,
        role_permissions.related,
        roles.owner
    )
}

/// Permissions of a batch of roles, tagged with the owning role.
pub(crate) fn permissions_of_roles(role_permissions: &PivotSql, permissions: &str) -> String {
    format!(
        "SELECT rp.{} AS owner_id, p.id, p.name, p.created_at, p.updated_at \
         FROM {} AS rp JOIN {permissions} AS p ON p.id = rp.{} \
         WHERE rp.{} = ANY($1) ORDER BY p.id",
        role_permissions.owner,
        role_permissions.table,
        role_permissions.related,
        role_permissions.owner
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pivot(table: &str) -> PivotSql {
        PivotSql::new(&Pivot::permissions(table)).unwrap()
    }

    #[test]
    fn pivot_identifiers_are_quoted() {
        let pivot = pivot("acl.user_has_permissions");
        assert_eq!(pivot.table, "\"acl\".\"user_has_permissions\"");
        assert_eq!(pivot.owner, "\"model_id\"");
        assert_eq!(pivot.related, "\"permission_id\"");
    }

    #[test]
    fn invalid_pivot_is_rejected() {
        let err = PivotSql::new(&Pivot::roles("user roles")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn find_or_create_statements() {
        assert_eq!(
            find_by_name("\"permissions\""),
            "SELECT id, name, created_at, updated_at FROM \"permissions\" WHERE name = $1"
        );
        let insert = insert_named("\"roles\"");
        assert!(insert.starts_with("INSERT INTO \"roles\" (name, created_at, updated_at)"));
        assert!(insert.contains("ON CONFLICT (name) DO NOTHING"));
        assert!(insert.ends_with("RETURNING id, name, created_at, updated_at"));
    }

    #[test]
    fn relation_statements_bind_owner_first() {
        let pivot = pivot("model_has_permissions");
        assert_eq!(
            related_exists(&pivot, "\"permissions\""),
            "SELECT EXISTS (SELECT 1 FROM \"model_has_permissions\" AS pv \
             JOIN \"permissions\" AS r ON r.id = pv.\"permission_id\" \
             WHERE pv.\"model_id\" = $1 AND r.name = $2) AS found"
        );
        assert!(related_rows(&pivot, "\"permissions\"").ends_with("ORDER BY r.id"));
        assert_eq!(
            attach(&pivot),
            "INSERT INTO \"model_has_permissions\" (\"model_id\", \"permission_id\") \
             SELECT $1, unnest($2::bigint[]) ON CONFLICT DO NOTHING"
        );
        assert_eq!(
            detach_others(&pivot),
            "DELETE FROM \"model_has_permissions\" WHERE \"model_id\" = $1 \
             AND NOT (\"permission_id\" = ANY($2))"
        );
    }

    #[test]
    fn role_graph_joins_through_the_role_pivot() {
        let roles = PivotSql::new(&Pivot::roles("model_has_roles")).unwrap();
        let role_permissions =
            PivotSql::new(&Pivot::role_permissions("role_has_permissions")).unwrap();
        let query = role_permission_exists(&roles, &role_permissions, "\"permissions\"");
        assert!(query.contains(
            "JOIN \"role_has_permissions\" AS rp ON rp.\"role_id\" = mr.\"role_id\""
        ));
        assert!(query.contains("WHERE mr.\"model_id\" = $1 AND p.name = $2"));

        let preload = permissions_of_roles(&role_permissions, "\"permissions\"");
        assert!(preload.starts_with("SELECT rp.\"role_id\" AS owner_id"));
        assert!(preload.contains("WHERE rp.\"role_id\" = ANY($1)"));
    }
}
