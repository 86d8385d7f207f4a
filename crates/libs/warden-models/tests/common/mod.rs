#![allow(dead_code)]

use diesel::{
    PgConnection, RunQueryDsl,
    r2d2::{ConnectionManager, Pool},
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use warden::AuthorizableModel;
use warden_config::{AuthorizableConfig, DatabaseConfig, TableNames};
use warden_models::{db::connection::DbConnection, schema::Schema, store::PgStore};

static INIT: std::sync::Once = std::sync::Once::new();

pub fn setup_test_environment() {
    INIT.call_once(|| {
        tracing_subscriber::registry()
            .with(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warden=debug,warden_models=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .init();
    });
}

fn admin_pool(base_url: &str) -> Pool<ConnectionManager<PgConnection>> {
    let manager = ConnectionManager::<PgConnection>::new(format!("{base_url}/postgres"));
    Pool::builder()
        .max_size(1)
        .build(manager)
        .expect("Failed to connect to base database")
}

/// A throwaway database with the authorization tables and the default
/// host pivots installed. Dropped with the context.
pub struct DbTestContext {
    pub connection: DbConnection,
    pub tables: TableNames,
    pub authorizable: AuthorizableConfig,
    base_url: String,
    db_name: String,
}

impl DbTestContext {
    pub async fn create() -> Self {
        setup_test_environment();
        let base_url =
            std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL env variable missing");
        let db_name = format!("warden_test_{}", uuid::Uuid::new_v4().simple());

        {
            let mut conn = admin_pool(&base_url)
                .get()
                .expect("Failed to get connection");
            diesel::sql_query(format!("CREATE DATABASE {db_name}"))
                .execute(&mut conn)
                .expect("Failed to create test database");
        }

        let config = DatabaseConfig {
            database_url: format!("{base_url}/{db_name}"),
        };
        let connection = DbConnection::new(&config).expect("Failed to connect to test database");
        let tables = TableNames::default();
        let authorizable = AuthorizableConfig::default();
        let schema = Schema::new(&tables).expect("Invalid table names");
        schema
            .install(&connection)
            .await
            .expect("Failed to install schema");
        schema
            .install_pivots(&connection, &authorizable, None)
            .await
            .expect("Failed to install pivots");

        Self {
            connection,
            tables,
            authorizable,
            base_url,
            db_name,
        }
    }

    pub fn store(&self) -> PgStore {
        PgStore::new(self.connection.clone(), &self.tables).expect("Invalid table names")
    }

    pub fn model(&self) -> AuthorizableModel<PgStore> {
        AuthorizableModel::new(self.store(), &self.authorizable)
    }
}

impl Drop for DbTestContext {
    fn drop(&mut self) {
        let mut conn = admin_pool(&self.base_url)
            .get()
            .expect("Failed to get connection for cleanup");

        diesel::sql_query(format!(
            "SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}'",
            self.db_name
        ))
        .execute(&mut conn)
        .ok();

        diesel::sql_query(format!("DROP DATABASE IF EXISTS {}", self.db_name))
            .execute(&mut conn)
            .ok();
    }
}
