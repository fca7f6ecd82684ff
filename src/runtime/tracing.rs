//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the global subscriber used by the `order-tracker` binary.
//!
//! ## Configuration
//!
//! - **Configurable log levels** via the `RUST_LOG` environment variable (default `info`)
//! - **Compact format** without module paths; structured fields carry the context
//!
//! ```bash
//! # Status transitions only
//! RUST_LOG=info cargo run
//!
//! # Every tick, request payloads included
//! RUST_LOG=debug cargo run
//!
//! # Quiet the HTTP stack, keep the tracker verbose
//! RUST_LOG=order_tracker=debug,reqwest=warn cargo run
//! ```
//!
//! ## Workflow Trace Example
//!
//! ```text
//! INFO Tracking session started
//! INFO submit: Order submitted to gateway ticket=1
//! INFO Order accepted order_id=77 status=RECEIVED
//! INFO Polling started order_id=77 generation=1 interval_ms=2000
//! INFO Order status changed order_id=77 status=STOCK_RESERVED
//! WARN Status fetch failed order_id=77 sequence=3 error=Network error: ...
//! WARN Poll failed, keeping last view order_id=77 failures=1 error=Network error: ...
//! INFO Order status changed order_id=77 status=SCHEDULED_FOR_DELIVERY
//! INFO Polling stopped order_id=77 generation=2
//! INFO Order reached a terminal status order_id=77
//! ```

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber. Call once, at startup.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
