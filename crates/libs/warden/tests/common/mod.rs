#![allow(dead_code)]

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use warden::{
    AuthorizableModel, GrantablePermissions, GrantableRoles, memory::MemoryStore,
};
use warden_config::AuthorizableConfig;

pub const PERMISSIONS_PIVOT: &str = "model_has_permissions";
pub const ROLES_PIVOT: &str = "model_has_roles";

static INIT: std::sync::Once = std::sync::Once::new();

pub fn setup_test_environment() {
    INIT.call_once(|| {
        tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warden=debug".into()))
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .init();
    });
}

pub fn permissions_model() -> (MemoryStore, GrantablePermissions<MemoryStore>) {
    setup_test_environment();
    let store = MemoryStore::default();
    let model = GrantablePermissions::new(store.clone(), PERMISSIONS_PIVOT);
    (store, model)
}

pub fn roles_model() -> (MemoryStore, GrantableRoles<MemoryStore>) {
    setup_test_environment();
    let store = MemoryStore::default();
    let model = GrantableRoles::new(store.clone(), ROLES_PIVOT);
    (store, model)
}

pub fn authorizable_model() -> (MemoryStore, AuthorizableModel<MemoryStore>) {
    setup_test_environment();
    let store = MemoryStore::default();
    let model = AuthorizableModel::new(
        store.clone(),
        &AuthorizableConfig::new(PERMISSIONS_PIVOT, ROLES_PIVOT),
    );
    (store, model)
}
