use log::{debug, trace};
use sqlx::{types::Json, SqliteConnection};

use crate::db_types::{CompletedCheckout, NewOrder, Order};

/// Inserts a new order in the `created` state, without a session id.
pub async fn insert_pending_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (amount_total, currency, status, cart_snapshot)
            VALUES ($1, $2, 'created', $3)
            RETURNING *;
        "#,
    )
    .bind(order.amount_total)
    .bind(order.currency)
    .bind(Json(order.cart_snapshot))
    .fetch_one(conn)
    .await?;
    debug!("📝️ Pending order #{} inserted for {} {}", order.id, order.amount_total, order.currency);
    Ok(order)
}

/// Sets the session id on an order that does not have one yet. Returns `None` if no such order exists, or if it
/// already has a session id.
///
/// A unique-constraint violation is returned as an error if another order already holds `session_id`.
pub async fn link_session(
    order_id: i64,
    session_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders
            SET external_session_id = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND external_session_id IS NULL
            RETURNING *;
        "#,
    )
    .bind(session_id)
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    trace!("📝️ Link session {session_id} -> order #{order_id}: {}", if order.is_some() { "linked" } else { "no-op" });
    Ok(order)
}

/// Moves the order for the session to `paid`, inserting it if it does not exist. Runs as a single upsert so that
/// concurrent deliveries for the same session are serialised by the unique index on `external_session_id`.
///
/// Returns `None` if the order was already `paid`, in which case nothing was written.
///
/// The cart snapshot of an existing order is never replaced. The statement is always stepped to completion, so the
/// write is done by the time this returns.
pub async fn upsert_paid_order(
    checkout: &CompletedCheckout,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            INSERT INTO orders (amount_total, currency, status, cart_snapshot, customer_email, external_session_id)
            VALUES ($1, $2, 'paid', $3, $4, $5)
            ON CONFLICT (external_session_id) DO UPDATE SET
                status = 'paid',
                amount_total = excluded.amount_total,
                currency = excluded.currency,
                customer_email = excluded.customer_email,
                updated_at = CURRENT_TIMESTAMP
            WHERE orders.status <> 'paid'
            RETURNING *;
        "#,
    )
    .bind(checkout.amount_total)
    .bind(checkout.currency.as_str())
    .bind(Json(&checkout.cart_snapshot))
    .bind(checkout.customer_email.as_deref())
    .bind(checkout.session_id.as_str())
    .fetch_all(conn)
    .await?
    .into_iter()
    .next();
    Ok(order)
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_by_session_id(
    session_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE external_session_id = $1")
        .bind(session_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn count_orders(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders").fetch_one(conn).await?;
    Ok(count)
}
