//! Status classification and the progress projection built on top of it.
//!
//! - [`classifier`]: terminal / failed / ordinal / label, all total functions.
//! - [`progress`]: progress steps and color tones for a status panel.

pub mod classifier;
pub mod progress;

pub use classifier::*;
pub use progress::*;
