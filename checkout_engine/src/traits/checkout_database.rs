use thiserror::Error;

use crate::{
    db_types::{CompletedCheckout, NewOrder, Order},
    traits::data_objects::ReconcileOutcome,
};

/// The durable order store.
///
/// Implementations must enforce that `external_session_id` is unique across orders.
#[allow(async_fn_in_trait)]
pub trait CheckoutDatabase: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores a priced cart as a new order in the `created` state. No session id is assigned yet.
    async fn insert_pending_order(&self, order: NewOrder) -> Result<Order, CheckoutDatabaseError>;

    /// Assigns the provider's session id to a pending order.
    ///
    /// Linking the same session to the same order twice is a no-op. It is an error to link a session that already
    /// belongs to another order, or to link an order that already has a different session.
    async fn link_session(&self, order_id: i64, session_id: &str) -> Result<Order, CheckoutDatabaseError>;

    /// In a single atomic statement, ensures that the order for `checkout.session_id` is `paid`:
    /// * A `created` order with this session id is moved to `paid`, taking the amount, currency and customer email
    ///   from `checkout`. Its cart snapshot is left untouched.
    /// * If no order has this session id, one is inserted directly as `paid` with the cart from `checkout`.
    /// * If the order is already `paid`, nothing is written and [`ReconcileOutcome::AlreadyReconciled`] is returned.
    async fn finalize_order(&self, checkout: &CompletedCheckout) -> Result<ReconcileOutcome, CheckoutDatabaseError>;

    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, CheckoutDatabaseError>;

    async fn fetch_order_by_session_id(&self, session_id: &str) -> Result<Option<Order>, CheckoutDatabaseError>;

    /// The total number of orders in the store.
    async fn count_orders(&self) -> Result<i64, CheckoutDatabaseError>;

    /// Closes the underlying connection pool
    async fn close(&mut self) -> Result<(), CheckoutDatabaseError>;
}

#[derive(Debug, Clone, Error)]
pub enum CheckoutDatabaseError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("The requested order (internal id {0}) does not exist")]
    OrderNotFound(i64),
    #[error("Checkout session {0} is already linked to another order")]
    SessionAlreadyLinked(String),
    #[error("Order {0} is already linked to a different checkout session")]
    OrderAlreadyLinked(i64),
}
