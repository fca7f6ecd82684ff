//! # Mock Gateway
//!
//! A scripted [`OrderGateway`] for testing the tracking engine without a running service.
//!
//! Queue responses with [`MockGateway::expect_submit`] and [`MockGateway::expect_fetch`],
//! hand [`MockGateway::gateway`] to the code under test, then call [`MockGateway::verify`].
//!
//! ```ignore
//! let mock = MockGateway::new();
//! mock.expect_submit().return_ok(view(77, OrderStatus::Received));
//! mock.expect_fetch(OrderId(77)).return_ok(view(77, OrderStatus::ScheduledForDelivery));
//!
//! let session = OrderTrackingSession::spawn(mock.gateway(), TrackerConfig::default());
//! // drive the session...
//! mock.verify(); // Ensures all expectations were met
//! ```
//!
//! Fetch expectations are matched by order id, in the order they were queued.
//! A call with no matching expectation answers with a [`GatewayError::Transport`]
//! and is counted as unexpected.

use crate::gateway::{GatewayError, OrderGateway};
use crate::model::{OrderId, OrderRequest, OrderView};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct Scripted {
    response: Result<OrderView, GatewayError>,
    delay: Option<Duration>,
}

struct FetchExpectation {
    id: OrderId,
    scripted: Scripted,
}

#[derive(Default)]
struct MockState {
    submits: VecDeque<Scripted>,
    fetches: VecDeque<FetchExpectation>,
    submit_calls: Vec<OrderRequest>,
    fetch_calls: Vec<OrderId>,
    unexpected: Vec<String>,
}

/// A mock gateway with expectation tracking for fluent testing.
#[derive(Clone, Default)]
pub struct MockGateway {
    state: Arc<Mutex<MockState>>,
}

impl MockGateway {
    /// Creates a new mock gateway with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the gateway for use in tests.
    pub fn gateway(&self) -> Arc<dyn OrderGateway> {
        Arc::new(self.clone())
    }

    /// Expects a `submit_order` call.
    pub fn expect_submit(&self) -> SubmitExpectationBuilder {
        SubmitExpectationBuilder {
            delay: None,
            state: self.state.clone(),
        }
    }

    /// Expects a `fetch_order_status` call for `id`.
    pub fn expect_fetch(&self, id: OrderId) -> FetchExpectationBuilder {
        FetchExpectationBuilder {
            id,
            delay: None,
            state: self.state.clone(),
        }
    }

    /// Every request passed to `submit_order`, in call order.
    pub fn submit_calls(&self) -> Vec<OrderRequest> {
        self.state.lock().unwrap().submit_calls.clone()
    }

    /// Every id passed to `fetch_order_status`, in call order.
    pub fn fetch_calls(&self) -> Vec<OrderId> {
        self.state.lock().unwrap().fetch_calls.clone()
    }

    /// Verifies that all expectations were met and nothing unexpected was called.
    pub fn verify(&self) {
        let state = self.state.lock().unwrap();
        if !state.unexpected.is_empty() {
            panic!("Unexpected gateway calls: {:?}", state.unexpected);
        }
        let remaining = state.submits.len() + state.fetches.len();
        if remaining != 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }

    async fn play(scripted: Scripted) -> Result<OrderView, GatewayError> {
        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }
        scripted.response
    }
}

#[async_trait]
impl OrderGateway for MockGateway {
    async fn submit_order(&self, request: &OrderRequest) -> Result<OrderView, GatewayError> {
        let scripted = {
            let mut state = self.state.lock().unwrap();
            state.submit_calls.push(request.clone());
            let next = state.submits.pop_front();
            if next.is_none() {
                state.unexpected.push("submit_order".to_string());
            }
            next
        };

        match scripted {
            Some(scripted) => Self::play(scripted).await,
            None => Err(GatewayError::Transport("no submit expectation left".into())),
        }
    }

    async fn fetch_order_status(&self, id: OrderId) -> Result<OrderView, GatewayError> {
        let scripted = {
            let mut state = self.state.lock().unwrap();
            state.fetch_calls.push(id);
            let position = state.fetches.iter().position(|exp| exp.id == id);
            let next = position.and_then(|index| state.fetches.remove(index));
            if next.is_none() {
                state.unexpected.push(format!("fetch_order_status({id})"));
            }
            next
        };

        match scripted {
            Some(expectation) => Self::play(expectation.scripted).await,
            None => Err(GatewayError::Transport(format!(
                "no fetch expectation left for order {id}"
            ))),
        }
    }
}

/// Builder for `submit_order` expectations.
pub struct SubmitExpectationBuilder {
    delay: Option<Duration>,
    state: Arc<Mutex<MockState>>,
}

impl SubmitExpectationBuilder {
    /// Answers only after `delay` has elapsed.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, view: OrderView) {
        self.push(Ok(view));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: GatewayError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<OrderView, GatewayError>) {
        let mut state = self.state.lock().unwrap();
        state.submits.push_back(Scripted {
            response,
            delay: self.delay,
        });
    }
}

/// Builder for `fetch_order_status` expectations.
pub struct FetchExpectationBuilder {
    id: OrderId,
    delay: Option<Duration>,
    state: Arc<Mutex<MockState>>,
}

impl FetchExpectationBuilder {
    /// Answers only after `delay` has elapsed.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, view: OrderView) {
        self.push(Ok(view));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: GatewayError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<OrderView, GatewayError>) {
        let mut state = self.state.lock().unwrap();
        state.fetches.push_back(FetchExpectation {
            id: self.id,
            scripted: Scripted {
                response,
                delay: self.delay,
            },
        });
    }
}
