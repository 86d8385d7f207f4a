//! An in-process [`Store`].
//!
//! Rows and grants live behind one async mutex, so find-or-create is atomic
//! and pivots are true sets. Handy for tests of code built on the
//! capabilities.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt,
    marker::PhantomData,
    sync::Arc,
};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;
use warden_config::TableNames;

use crate::{
    entity::{Named, Permission, Role, RoleWithPermissions},
    prelude::*,
    store::{Catalog, Pivot, Relation, RoleRelation, Store},
};

/// The two tables the memory store keeps rows in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    /// Permission rows.
    Permission,
    /// Role rows.
    Role,
}

/// Rows the memory store can hold.
pub trait MemoryRow: Named + Clone + Send + Sync + 'static {
    /// The table rows of this type live in.
    const KIND: RowKind;

    /// Rebuild a row from its stored columns.
    fn from_columns(id: i64, name: &str, created_at: DateTime<Utc>) -> Self;
}

impl MemoryRow for Permission {
    const KIND: RowKind = RowKind::Permission;

    fn from_columns(id: i64, name: &str, created_at: DateTime<Utc>) -> Self {
        Permission {
            id,
            name: name.to_string(),
            created_at,
            updated_at: created_at,
        }
    }
}

impl MemoryRow for Role {
    const KIND: RowKind = RowKind::Role;

    fn from_columns(id: i64, name: &str, created_at: DateTime<Utc>) -> Self {
        Role {
            id,
            name: name.to_string(),
            created_at,
            updated_at: created_at,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    /// Row ID to `(name, created_at)`, per table.
    rows: HashMap<RowKind, BTreeMap<i64, (String, DateTime<Utc>)>>,
    /// Pivot table name to `(owner, related)` pairs.
    pivots: HashMap<String, BTreeSet<(i64, i64)>>,
}

impl State {
    fn row<T: MemoryRow>(&self, id: i64) -> Option<T> {
        self.rows
            .get(&T::KIND)?
            .get(&id)
            .map(|(name, created_at)| T::from_columns(id, name, *created_at))
    }

    fn find<T: MemoryRow>(&self, name: &str) -> Option<T> {
        self.rows
            .get(&T::KIND)?
            .iter()
            .find(|(_, (row_name, _))| row_name == name)
            .map(|(&id, (row_name, created_at))| T::from_columns(id, row_name, *created_at))
    }

    fn all<T: MemoryRow>(&self) -> Vec<T> {
        self.rows
            .get(&T::KIND)
            .map(|rows| {
                rows.iter()
                    .map(|(&id, (name, created_at))| T::from_columns(id, name, *created_at))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn insert<T: MemoryRow>(&mut self, name: &str) -> T {
        self.last_id += 1;
        let id = self.last_id;
        let created_at = Utc::now();
        self.rows
            .entry(T::KIND)
            .or_default()
            .insert(id, (name.to_string(), created_at));
        T::from_columns(id, name, created_at)
    }

    fn related_ids(&self, table: &str, owner: i64) -> Vec<i64> {
        self.pivots
            .get(table)
            .map(|pairs| {
                pairs
                    .range((owner, i64::MIN)..=(owner, i64::MAX))
                    .map(|&(_, related)| related)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Related rows in ID order. Grants pointing at missing rows are skipped.
    fn related<T: MemoryRow>(&self, table: &str, owner: i64) -> Vec<T> {
        self.related_ids(table, owner)
            .into_iter()
            .filter_map(|id| self.row(id))
            .collect()
    }
}

/// Permission or role rows held in memory.
pub struct MemoryCatalog<T> {
    state: Arc<Mutex<State>>,
    row: PhantomData<fn() -> T>,
}

impl<T> Clone for MemoryCatalog<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            row: PhantomData,
        }
    }
}

impl<T> fmt::Debug for MemoryCatalog<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCatalog").finish_non_exhaustive()
    }
}

impl<T: MemoryRow> Catalog<T> for MemoryCatalog<T> {
    async fn first_or_create(&self, name: &str) -> Result<T> {
        let mut state = self.state.lock().await;
        if let Some(row) = state.find(name) {
            return Ok(row);
        }
        let row: T = state.insert(name);
        debug!(id = row.id(), name, "Created row");
        Ok(row)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<T>> {
        let state = self.state.lock().await;
        Ok(state.find(name))
    }

    async fn all(&self) -> Result<Vec<T>> {
        let state = self.state.lock().await;
        Ok(state.all())
    }
}

/// Grants of one owner over one pivot, held in memory.
pub struct MemoryRelation<T> {
    state: Arc<Mutex<State>>,
    table: String,
    owner: i64,
    role_permissions: String,
    row: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for MemoryRelation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryRelation")
            .field("table", &self.table)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

impl<T: MemoryRow> Relation<T> for MemoryRelation<T> {
    async fn exists(&self, name: &str) -> Result<bool> {
        let state = self.state.lock().await;
        Ok(state
            .related::<T>(&self.table, self.owner)
            .iter()
            .any(|row| row.name() == name))
    }

    async fn load(&self) -> Result<Vec<T>> {
        let state = self.state.lock().await;
        Ok(state.related(&self.table, self.owner))
    }

    async fn names(&self) -> Result<Vec<String>> {
        let state = self.state.lock().await;
        Ok(state
            .related::<T>(&self.table, self.owner)
            .into_iter()
            .map(|row| row.name().to_string())
            .collect())
    }

    async fn attach(&self, ids: &[i64]) -> Result<()> {
        let mut state = self.state.lock().await;
        let pairs = state.pivots.entry(self.table.clone()).or_default();
        pairs.extend(ids.iter().map(|&id| (self.owner, id)));
        Ok(())
    }

    async fn detach(&self, ids: &[i64]) -> Result<()> {
        let mut state = self.state.lock().await;
        if let Some(pairs) = state.pivots.get_mut(&self.table) {
            for &id in ids {
                pairs.remove(&(self.owner, id));
            }
        }
        Ok(())
    }

    async fn sync(&self, ids: &[i64]) -> Result<()> {
        let mut state = self.state.lock().await;
        let owner = self.owner;
        let pairs = state.pivots.entry(self.table.clone()).or_default();
        pairs.retain(|&(o, related)| o != owner || ids.contains(&related));
        pairs.extend(ids.iter().map(|&id| (owner, id)));
        Ok(())
    }
}

impl RoleRelation for MemoryRelation<Role> {
    async fn exists_with_permission(&self, permission: &str) -> Result<bool> {
        let state = self.state.lock().await;
        Ok(state.related_ids(&self.table, self.owner).into_iter().any(|role| {
            state
                .related::<Permission>(&self.role_permissions, role)
                .iter()
                .any(|p| p.name == permission)
        }))
    }

    async fn load_with_permissions(&self) -> Result<Vec<RoleWithPermissions>> {
        let state = self.state.lock().await;
        Ok(state
            .related::<Role>(&self.table, self.owner)
            .into_iter()
            .map(|role| RoleWithPermissions {
                permissions: state.related(&self.role_permissions, role.id),
                role,
            })
            .collect())
    }
}

/// A [`Store`] kept entirely in memory.
///
/// ```rust
/// use warden::{HasPermissions, GrantablePermissions, memory::MemoryStore};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let users = GrantablePermissions::new(MemoryStore::default(), "user_has_permissions");
/// let alice = users.entity(1);
/// alice.give_permission_to(["edit"]).await?;
/// assert!(alice.has_permission_to("edit").await?);
/// # Ok::<(), warden::Error>(())
/// # }).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    permissions: MemoryCatalog<Permission>,
    roles: MemoryCatalog<Role>,
    role_permissions: Pivot,
}

impl MemoryStore {
    /// An empty store using `tables.role_has_permissions` as the role pivot.
    pub fn new(tables: &TableNames) -> Self {
        let state = Arc::new(Mutex::new(State::default()));
        Self {
            permissions: MemoryCatalog {
                state: state.clone(),
                row: PhantomData,
            },
            roles: MemoryCatalog {
                state: state.clone(),
                row: PhantomData,
            },
            state,
            role_permissions: Pivot::role_permissions(&tables.role_has_permissions),
        }
    }

    /// Number of grants stored in the pivot `table`.
    pub async fn grant_count(&self, table: &str) -> usize {
        let state = self.state.lock().await;
        state.pivots.get(table).map_or(0, BTreeSet::len)
    }

    fn relation<T>(&self, pivot: &Pivot, owner: i64) -> MemoryRelation<T> {
        MemoryRelation {
            state: self.state.clone(),
            table: pivot.table.clone(),
            owner,
            role_permissions: self.role_permissions.table.clone(),
            row: PhantomData,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(&TableNames::default())
    }
}

impl Store for MemoryStore {
    type Permissions = MemoryCatalog<Permission>;
    type Roles = MemoryCatalog<Role>;
    type PermissionRelation = MemoryRelation<Permission>;
    type RoleRelation = MemoryRelation<Role>;

    fn permission_catalog(&self) -> &Self::Permissions {
        &self.permissions
    }

    fn role_catalog(&self) -> &Self::Roles {
        &self.roles
    }

    fn permissions_of(&self, pivot: &Pivot, owner: i64) -> Self::PermissionRelation {
        self.relation(pivot, owner)
    }

    fn roles_of(&self, pivot: &Pivot, owner: i64) -> Self::RoleRelation {
        self.relation(pivot, owner)
    }

    fn role_permissions_pivot(&self) -> &Pivot {
        &self.role_permissions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_or_create_reuses_existing_rows() -> Result<()> {
        let store = MemoryStore::default();
        let first = store.permission_catalog().first_or_create("edit").await?;
        let again = store.permission_catalog().first_or_create("edit").await?;
        assert_eq!(first, again);
        assert_eq!(store.permission_catalog().all().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_first_or_create_yields_one_row() -> Result<()> {
        let store = MemoryStore::default();
        let calls = (0..16).map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.role_catalog().first_or_create("admin").await })
        });
        let mut ids = Vec::new();
        for call in calls {
            ids.push(call.await.expect("task panicked")?.id);
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(store.role_catalog().all().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn find_by_name_does_not_create() -> Result<()> {
        let store = MemoryStore::default();
        assert!(store.permission_catalog().find_by_name("edit").await?.is_none());
        assert!(store.permission_catalog().all().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn pivots_are_sets_per_owner() -> Result<()> {
        let store = MemoryStore::default();
        let pivot = Pivot::permissions("model_has_permissions");
        let edit = store.permission_catalog().first_or_create("edit").await?;
        let publish = store.permission_catalog().first_or_create("publish").await?;

        let one = store.permissions_of(&pivot, 1);
        let two = store.permissions_of(&pivot, 2);
        one.attach(&[edit.id, edit.id, publish.id]).await?;
        two.attach(&[publish.id]).await?;
        assert_eq!(store.grant_count("model_has_permissions").await, 3);

        one.sync(&[publish.id]).await?;
        assert_eq!(one.names().await?, vec![String::from("publish")]);
        assert_eq!(two.names().await?, vec![String::from("publish")]);

        two.detach(&[publish.id, edit.id]).await?;
        assert!(two.load().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn role_graph_follows_the_role_pivot() -> Result<()> {
        let store = MemoryStore::default();
        let admin = store.role_catalog().first_or_create("admin").await?;
        let publish = store.permission_catalog().first_or_create("publish").await?;
        store
            .permissions_of(store.role_permissions_pivot(), admin.id)
            .attach(&[publish.id])
            .await?;

        let roles = store.roles_of(&Pivot::roles("model_has_roles"), 1);
        assert!(!roles.exists_with_permission("publish").await?);
        roles.attach(&[admin.id]).await?;
        assert!(roles.exists_with_permission("publish").await?);

        let graph = roles.load_with_permissions().await?;
        assert_eq!(graph.len(), 1);
        assert_eq!(graph[0].role, admin);
        assert_eq!(graph[0].permissions, vec![publish]);
        Ok(())
    }
}
