//! Helpers for tests that need a real, throwaway database.
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

use crate::SqliteDatabase;

/// Loads `.env.test`, initialises logging, and returns a migrated database at `url`. Any existing database at that
/// location is dropped first.
pub async fn prepare_test_env(url: &str) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    if Sqlite::database_exists(url).await.unwrap_or(false) {
        if let Err(e) = Sqlite::drop_database(url).await {
            warn!("Error dropping database {url}: {e:?}");
        }
    }
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    db.run_migrations().await.expect("Error running DB migrations");
    db
}

/// A fresh database URL in the system temp directory.
pub fn random_db_path() -> String {
    let path = std::env::temp_dir().join(format!("checkout_test_{}.db", rand::random::<u64>()));
    format!("sqlite://{}", path.display())
}

pub async fn tear_down(mut db: SqliteDatabase) {
    use crate::traits::CheckoutDatabase;
    let url = db.url().to_string();
    if let Err(e) = db.close().await {
        error!("🚀️ Failed to close database: {e}");
    }
    if let Err(e) = Sqlite::drop_database(&url).await {
        warn!("🚀️ Failed to remove test database {url}: {e}");
    }
}
