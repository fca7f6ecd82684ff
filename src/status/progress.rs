//! Display projection of an order's status: the progress steps and color tones a
//! status panel renders from.

use crate::model::{ItemStatus, OrderStatus};
use crate::status::classifier::PROGRESS_SEQUENCE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Completed,
    Current,
    Pending,
}

/// One row of the progress list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressStep {
    pub status: OrderStatus,
    pub label: String,
    pub state: StepState,
    /// Secondary line under the label, if any.
    pub caption: Option<&'static str>,
}

/// What the progress panel should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// The order failed; no steps are shown.
    Failed,
    Steps(Vec<ProgressStep>),
}

/// Builds the progress projection for `status`.
///
/// `is_polling` decides whether the current step reads "In Progress..." or
/// "Current Status". A status outside the happy path leaves every step pending.
pub fn progress(status: &OrderStatus, is_polling: bool) -> Progress {
    if status.is_failed() {
        return Progress::Failed;
    }

    let current = status.progress_index();
    let steps = PROGRESS_SEQUENCE
        .iter()
        .enumerate()
        .map(|(index, step)| {
            let state = match current {
                Some(current) if index < current => StepState::Completed,
                Some(current) if index == current => StepState::Current,
                _ => StepState::Pending,
            };
            let caption = match state {
                StepState::Completed => Some("Completed"),
                StepState::Current if is_polling => Some("In Progress..."),
                StepState::Current => Some("Current Status"),
                StepState::Pending => None,
            };
            ProgressStep {
                status: step.clone(),
                label: step.label(),
                state,
                caption,
            }
        })
        .collect();

    Progress::Steps(steps)
}

/// Color family for a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Info,
    Success,
    Danger,
    Neutral,
}

pub fn tone(status: &OrderStatus) -> StatusTone {
    match status {
        OrderStatus::Received => StatusTone::Info,
        OrderStatus::StockReserved | OrderStatus::ScheduledForDelivery => StatusTone::Success,
        OrderStatus::Failed => StatusTone::Danger,
        OrderStatus::Other(_) => StatusTone::Neutral,
    }
}

pub fn item_tone(status: Option<&ItemStatus>) -> StatusTone {
    match status {
        Some(ItemStatus::Reserved) => StatusTone::Success,
        Some(ItemStatus::NotAvailable) => StatusTone::Danger,
        _ => StatusTone::Neutral,
    }
}
