#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Order Tracker
//!
//! > **Submit an order, follow it until it is scheduled for delivery or fails.**
//!
//! This crate is the client side of an order-processing service: it submits a
//! multi-item order over HTTP, polls the order's status on a fixed interval, and
//! turns each answer into a progress model a status panel can render.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### One owner for all tracking state
//! The session is an actor. A single Tokio task owns the current view, the error
//! state and the polling timer, and processes requests and completions one at a
//! time. No locks guard session state; callers hold a cheap, cloneable handle.
//!
//! ### Cancellation by generation
//! Every start or stop of polling advances a generation token. Fetch results are
//! tagged with the generation that issued them and dropped if it is no longer
//! current, so a stopped or superseded order never mutates the session again.
//!
//! ### Transient failures don't end tracking
//! A failed status fetch is logged and counted; the last good view stays in place
//! and the next tick runs on schedule. Only a terminal status, an explicit stop,
//! a new submission, teardown, or an optional failure bound ends polling.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Data ([`model`])
//! Wire DTOs: [`OrderRequest`](model::OrderRequest), [`OrderView`](model::OrderView),
//! [`OrderStatus`](model::OrderStatus).
//!
//! ### 2. The Classifier ([`status`])
//! Pure functions: terminal / failed / progress ordinal / display label, plus the
//! [`Progress`](status::Progress) projection.
//!
//! ### 3. The Seam ([`gateway`])
//! [`OrderGateway`](gateway::OrderGateway) with an HTTP implementation and a
//! scripted [`MockGateway`](gateway::mock::MockGateway) for tests.
//!
//! ### 4. The Timer ([`polling`])
//! [`PollingController`](polling::PollingController): start, stop, supersede, drop.
//!
//! ### 5. The Orchestrator ([`session`])
//! [`OrderTrackingSession`](session::OrderTrackingSession): submit → poll → classify →
//! stop on terminal.
//!
//! ## 🚀 Quick Start
//!
//! ```ignore
//! let config = TrackerConfig::from_env();
//! let gateway = Arc::new(HttpOrderGateway::new(&config)?);
//! let session = OrderTrackingSession::spawn(gateway, config);
//!
//! session.submit(OrderRequest::new(102, "456 Pine St", vec![OrderLine::new(1000, 1)])).await?;
//! let done = session.settled().await?;
//! ```
//!
//! ### Running the Demo
//!
//! ```bash
//! # Run against a local order-processing service
//! RUST_LOG=info ORDER_TRACKER_ENDPOINT=http://localhost:8082/orders cargo run
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod config;
pub mod gateway;
pub mod model;
pub mod polling;
pub mod runtime;
pub mod session;
pub mod status;
