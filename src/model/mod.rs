//! Pure data structures (DTOs) exchanged with the order-processing service.
//!
//! - [`OrderRequest`] is what the operator submits.
//! - [`OrderView`] is what the service answers with, both on submit and on every status fetch.
//! - [`OrderStatus`] and [`ItemStatus`] carry the raw wire tokens; unknown tokens are kept verbatim.

pub mod order;
pub mod status;

pub use order::*;
pub use status::*;
