#![allow(dead_code)]
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
    Mutex,
};

pub use checkout_engine::test_utils::tear_down;
use checkout_engine::{
    test_utils::{prepare_test_env, random_db_path},
    CheckoutSession,
    CheckoutSessionRequest,
    PaymentProvider,
    PaymentProviderError,
    SqliteDatabase,
};

pub async fn setup() -> SqliteDatabase {
    prepare_test_env(&random_db_path()).await
}

/// Hands out sequential session ids and remembers every request it was given.
#[derive(Clone, Default)]
pub struct FakeProvider {
    pub requests: Arc<Mutex<Vec<CheckoutSessionRequest>>>,
    counter: Arc<AtomicUsize>,
    pub fail: bool,
    /// Every call returns this session id if set
    pub fixed_session: Option<String>,
}

impl FakeProvider {
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn with_fixed_session(session_id: &str) -> Self {
        Self { fixed_session: Some(session_id.to_string()), ..Default::default() }
    }

    pub fn calls(&self) -> Vec<CheckoutSessionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl PaymentProvider for FakeProvider {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentProviderError> {
        self.requests.lock().unwrap().push(request);
        if self.fail {
            return Err(PaymentProviderError::Unavailable("connection refused".into()));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let id = self.fixed_session.clone().unwrap_or_else(|| format!("cs_test_{n}"));
        Ok(CheckoutSession::new(id.clone(), format!("https://checkout.example/pay/{id}")))
    }
}
