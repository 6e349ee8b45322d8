//! `SqliteDatabase` is a concrete implementation of a checkout engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements [`CheckoutDatabase`].
use std::fmt::Debug;

use log::*;
use sqlx::{migrate::MigrateError, SqlitePool};

use super::db::{new_pool, orders};
use crate::{
    db_types::{CompletedCheckout, NewOrder, Order},
    traits::{CheckoutDatabase, CheckoutDatabaseError, ReconcileOutcome},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl From<sqlx::Error> for CheckoutDatabaseError {
    fn from(e: sqlx::Error) -> Self {
        CheckoutDatabaseError::DatabaseError(e.to_string())
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

impl SqliteDatabase {
    /// Creates a new database API object. The database file is created if it does not exist, but migrations are not
    /// run. Call [`SqliteDatabase::run_migrations`] for that.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool for {url}");
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub async fn run_migrations(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Migrations complete for {}", self.url);
        Ok(())
    }
}

impl CheckoutDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_pending_order(&self, order: NewOrder) -> Result<Order, CheckoutDatabaseError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_pending_order(order, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn link_session(&self, order_id: i64, session_id: &str) -> Result<Order, CheckoutDatabaseError> {
        let mut tx = self.pool.begin().await?;
        let linked = match orders::link_session(order_id, session_id, &mut tx).await {
            Ok(linked) => linked,
            Err(e) if is_unique_violation(&e) => {
                debug!("🗃️ Session {session_id} is already taken. Order #{order_id} was not linked.");
                return Err(CheckoutDatabaseError::SessionAlreadyLinked(session_id.to_string()));
            },
            Err(e) => return Err(e.into()),
        };
        let order = match linked {
            Some(order) => order,
            None => {
                let existing = orders::fetch_order_by_id(order_id, &mut tx)
                    .await?
                    .ok_or(CheckoutDatabaseError::OrderNotFound(order_id))?;
                if existing.external_session_id.as_deref() != Some(session_id) {
                    return Err(CheckoutDatabaseError::OrderAlreadyLinked(order_id));
                }
                trace!("🗃️ Order #{order_id} was already linked to {session_id}");
                existing
            },
        };
        tx.commit().await?;
        Ok(order)
    }

    async fn finalize_order(&self, checkout: &CompletedCheckout) -> Result<ReconcileOutcome, CheckoutDatabaseError> {
        let mut tx = self.pool.begin().await?;
        let paid = orders::upsert_paid_order(checkout, &mut tx).await?;
        tx.commit().await?;
        let outcome = match paid {
            Some(order) => {
                debug!("🗃️ Order #{} for session {} is now paid", order.id, checkout.session_id);
                ReconcileOutcome::Finalized(order)
            },
            None => {
                debug!("🗃️ Session {} was already reconciled", checkout.session_id);
                ReconcileOutcome::AlreadyReconciled
            },
        };
        Ok(outcome)
    }

    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, CheckoutDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_session_id(&self, session_id: &str) -> Result<Option<Order>, CheckoutDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_session_id(session_id, &mut conn).await?;
        Ok(order)
    }

    async fn count_orders(&self) -> Result<i64, CheckoutDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let count = orders::count_orders(&mut conn).await?;
        Ok(count)
    }

    async fn close(&mut self) -> Result<(), CheckoutDatabaseError> {
        self.pool.close().await;
        Ok(())
    }
}
