use crate::model::OrderView;
use crate::status::{progress, Progress};

/// Where a tracking session is in its submit/poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// Waiting for the service to accept the order.
    Submitting,
    /// Polling for status updates.
    Tracking,
    /// Final: terminal status reached, submission failed, or tracking stopped.
    Terminal,
}

/// Point-in-time copy of the session state, as published to observers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackingSnapshot {
    pub phase: SessionPhase,
    /// Last good view of the order. Cleared on every submit and on submission failure.
    pub current_view: Option<OrderView>,
    pub is_polling: bool,
    /// Submission error, or the reason polling was abandoned.
    pub last_error: Option<String>,
    pub consecutive_poll_failures: u32,
}

impl TrackingSnapshot {
    /// Progress projection of the current view, if there is one.
    pub fn progress(&self) -> Option<Progress> {
        self.current_view
            .as_ref()
            .map(|view| progress(&view.status, self.is_polling))
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == SessionPhase::Terminal
    }
}
