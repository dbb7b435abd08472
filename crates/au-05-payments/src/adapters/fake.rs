//! In-memory payment processor for development and tests

use crate::domain::{CheckoutSession, CheckoutSessionRequest, Refund};
use crate::error::ProcessorError;
use crate::ports::outbound::PaymentProcessor;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

const DEFAULT_CHECKOUT_BASE: &str = "https://checkout.invalid/pay";

#[derive(Default)]
struct Recorded {
    sessions: Vec<(CheckoutSession, CheckoutSessionRequest)>,
    expired: Vec<String>,
    refunds: Vec<(String, Option<i64>)>,
    next_id: u64,
}

/// Records every request and answers with predictable ids.
pub struct FakePaymentProcessor {
    checkout_base: String,
    recorded: Mutex<Recorded>,
    failing: AtomicBool,
}

impl Default for FakePaymentProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePaymentProcessor {
    pub fn new() -> Self {
        Self {
            checkout_base: DEFAULT_CHECKOUT_BASE.to_string(),
            recorded: Mutex::new(Recorded::default()),
            failing: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_checkout_base(mut self, base: impl Into<String>) -> Self {
        self.checkout_base = base.into();
        self
    }

    /// Make every call fail as if the processor were down.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sessions(&self) -> Vec<(CheckoutSession, CheckoutSessionRequest)> {
        self.recorded.lock().sessions.clone()
    }

    pub fn last_session(&self) -> Option<(CheckoutSession, CheckoutSessionRequest)> {
        self.recorded.lock().sessions.last().cloned()
    }

    pub fn expired(&self) -> Vec<String> {
        self.recorded.lock().expired.clone()
    }

    /// `(payment_intent, amount)` for every refund requested.
    pub fn refunds(&self) -> Vec<(String, Option<i64>)> {
        self.recorded.lock().refunds.clone()
    }

    fn check_available(&self) -> Result<(), ProcessorError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProcessorError::Unavailable("fake processor offline".into()));
        }
        Ok(())
    }

    fn next_id(recorded: &mut Recorded, prefix: &str) -> String {
        recorded.next_id += 1;
        format!("{prefix}_fake_{:06}", recorded.next_id)
    }
}

#[async_trait]
impl PaymentProcessor for FakePaymentProcessor {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, ProcessorError> {
        self.check_available()?;
        let mut recorded = self.recorded.lock();
        let id = Self::next_id(&mut recorded, "cs");
        let session = CheckoutSession {
            url: format!("{}/{id}", self.checkout_base),
            id,
        };
        recorded.sessions.push((session.clone(), request));
        Ok(session)
    }

    async fn expire_checkout_session(&self, session_id: &str) -> Result<(), ProcessorError> {
        self.check_available()?;
        self.recorded.lock().expired.push(session_id.to_string());
        Ok(())
    }

    async fn create_refund(
        &self,
        payment_intent: &str,
        amount_cents: Option<i64>,
    ) -> Result<Refund, ProcessorError> {
        self.check_available()?;
        let mut recorded = self.recorded.lock();
        let id = Self::next_id(&mut recorded, "re");
        recorded
            .refunds
            .push((payment_intent.to_string(), amount_cents));
        Ok(Refund {
            id,
            amount_cents: amount_cents.unwrap_or_default(),
            status: "succeeded".to_string(),
        })
    }
}
