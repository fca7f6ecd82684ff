//! Order tracking session: submit an order, follow it to a terminal status.
//!
//! The session is an actor. [`OrderTrackingSession`] is the cloneable handle;
//! [`actor::TrackingActor`] owns the state machine and the
//! [`PollingController`](crate::polling::PollingController).
//!
//! ```text
//!            submit                 accepted, not terminal
//!   Idle ──────────────▶ Submitting ───────────────────────▶ Tracking
//!                          │   ▲                                │
//!       failed / terminal  │   │ submit (from any phase)        │ terminal status,
//!                          ▼   │                                │ stop, failure bound
//!                        Terminal ◀─────────────────────────────┘
//! ```
//!
//! Observers read [`TrackingSnapshot`]s through [`OrderTrackingSession::snapshot`] or
//! [`OrderTrackingSession::subscribe`].

pub mod actor;
pub mod client;
pub mod error;
pub mod state;

pub use client::*;
pub use error::*;
pub use state::*;
