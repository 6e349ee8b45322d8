use checkout_engine::{
    db_types::{CompletedCheckout, NewOrder, Order},
    traits::{
        CheckoutDatabase,
        CheckoutDatabaseError,
        CheckoutSession,
        CheckoutSessionRequest,
        PaymentProvider,
        PaymentProviderError,
        ReconcileOutcome,
    },
};
use mockall::mock;

mock! {
    pub CheckoutDb {}
    impl Clone for CheckoutDb {
        fn clone(&self) -> Self;
    }
    impl CheckoutDatabase for CheckoutDb {
        fn url(&self) -> &str;
        async fn insert_pending_order(&self, order: NewOrder) -> Result<Order, CheckoutDatabaseError>;
        async fn link_session(&self, order_id: i64, session_id: &str) -> Result<Order, CheckoutDatabaseError>;
        async fn finalize_order(&self, checkout: &CompletedCheckout) -> Result<ReconcileOutcome, CheckoutDatabaseError>;
        async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, CheckoutDatabaseError>;
        async fn fetch_order_by_session_id(&self, session_id: &str) -> Result<Option<Order>, CheckoutDatabaseError>;
        async fn count_orders(&self) -> Result<i64, CheckoutDatabaseError>;
        async fn close(&mut self) -> Result<(), CheckoutDatabaseError>;
    }
}

mock! {
    pub Provider {}
    impl PaymentProvider for Provider {
        async fn create_checkout_session(&self, request: CheckoutSessionRequest) -> Result<CheckoutSession, PaymentProviderError>;
    }
}
