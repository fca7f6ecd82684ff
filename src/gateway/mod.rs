//! Access to the remote order-processing service.
//!
//! # Main Components
//!
//! - [`OrderGateway`] - The seam the tracking engine talks through
//! - [`HttpOrderGateway`] - JSON over HTTP implementation backed by `reqwest`
//! - [`GatewayError`] - Transport, status, parse and timeout failures
//!
//! # Testing
//!
//! See [`mock`] for a scripted gateway that lets tests drive the tracking engine
//! without a running service.

pub mod error;
pub mod http;
pub mod mock;

pub use error::*;
pub use http::*;

use crate::model::{OrderId, OrderRequest, OrderView};
use async_trait::async_trait;

/// Contract for submitting orders and reading their status back.
///
/// Implementations must be cheap to share: the tracking session holds one behind
/// an `Arc` and calls it from spawned tasks.
#[async_trait]
pub trait OrderGateway: Send + Sync + 'static {
    /// Creates an order and returns the service's first view of it.
    async fn submit_order(&self, request: &OrderRequest) -> Result<OrderView, GatewayError>;

    /// Reads the current view of an existing order.
    async fn fetch_order_status(&self, id: OrderId) -> Result<OrderView, GatewayError>;
}
