//! Error types for the tracking session.

use crate::gateway::GatewayError;
use thiserror::Error;

/// Errors returned by [`OrderTrackingSession`](crate::session::OrderTrackingSession) operations.
///
/// Failed status fetches are not listed here: they are transient, logged and
/// counted in the snapshot, and never surface to the caller.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TrackingError {
    /// The request was rejected before reaching the service.
    #[error("Invalid order request: {0}")]
    InvalidRequest(String),

    /// The service rejected the order, was unreachable, or answered with an unusable body.
    #[error("Order submission failed: {0}")]
    Submission(#[from] GatewayError),

    /// A newer `submit` replaced this one before it completed.
    #[error("Submission superseded by a newer order")]
    Superseded,

    /// The session actor is no longer running.
    #[error("Tracking session closed")]
    SessionClosed,
}
