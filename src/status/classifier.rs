//! Pure classification of order statuses.
//!
//! Everything here is a total function: unknown statuses are never an error,
//! they simply classify as "not terminal, not failed, no progress position".

use crate::model::OrderStatus;

/// Ordered happy path an order walks through.
pub const PROGRESS_SEQUENCE: [OrderStatus; 3] = [
    OrderStatus::Received,
    OrderStatus::StockReserved,
    OrderStatus::ScheduledForDelivery,
];

/// True once the order can no longer change.
pub fn is_terminal(status: &OrderStatus) -> bool {
    matches!(
        status,
        OrderStatus::ScheduledForDelivery | OrderStatus::Failed
    )
}

pub fn is_failed(status: &OrderStatus) -> bool {
    matches!(status, OrderStatus::Failed)
}

/// Position of `status` within [`PROGRESS_SEQUENCE`].
///
/// `None` for [`OrderStatus::Failed`] and for statuses outside the sequence.
/// Callers should branch on [`is_failed`] first.
pub fn progress_index(status: &OrderStatus) -> Option<usize> {
    match status {
        OrderStatus::Received => Some(0),
        OrderStatus::StockReserved => Some(1),
        OrderStatus::ScheduledForDelivery => Some(2),
        OrderStatus::Failed | OrderStatus::Other(_) => None,
    }
}

/// Turns an underscore-separated token into a display label.
///
/// `STOCK_RESERVED` becomes `Stock Reserved`. Empty segments (doubled or
/// trailing underscores) are dropped.
pub fn format_label(token: &str) -> String {
    token
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        is_terminal(self)
    }

    pub fn is_failed(&self) -> bool {
        is_failed(self)
    }

    pub fn progress_index(&self) -> Option<usize> {
        progress_index(self)
    }

    /// Human readable label, e.g. `Scheduled For Delivery`.
    pub fn label(&self) -> String {
        format_label(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(is_terminal(&OrderStatus::ScheduledForDelivery));
        assert!(is_terminal(&OrderStatus::Failed));
        assert!(!is_terminal(&OrderStatus::Received));
        assert!(!is_terminal(&OrderStatus::StockReserved));
        assert!(!is_terminal(&OrderStatus::from("DELIVERED")));
        assert!(!is_terminal(&OrderStatus::from("")));
    }

    #[test]
    fn test_progress_index() {
        assert_eq!(progress_index(&OrderStatus::Received), Some(0));
        assert_eq!(progress_index(&OrderStatus::StockReserved), Some(1));
        assert_eq!(progress_index(&OrderStatus::ScheduledForDelivery), Some(2));
        assert_eq!(progress_index(&OrderStatus::Failed), None);
        assert_eq!(progress_index(&OrderStatus::from("ASSIGNED")), None);
    }

    #[test]
    fn test_progress_index_matches_sequence() {
        for (index, status) in PROGRESS_SEQUENCE.iter().enumerate() {
            assert_eq!(progress_index(status), Some(index));
        }
    }

    #[test]
    fn test_is_failed() {
        assert!(is_failed(&OrderStatus::Failed));
        assert!(!is_failed(&OrderStatus::ScheduledForDelivery));
        assert!(!is_failed(&OrderStatus::from("FAILED_LATER")));
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label("STOCK_RESERVED"), "Stock Reserved");
        assert_eq!(format_label("SCHEDULED_FOR_DELIVERY"), "Scheduled For Delivery");
        assert_eq!(format_label("X"), "X");
        assert_eq!(format_label("NOT_AVAILABLE"), "Not Available");
        assert_eq!(format_label("received"), "Received");
        assert_eq!(format_label(""), "");
        assert_eq!(format_label("__A__B_"), "A B");
    }

    #[test]
    fn test_label_for_unknown_status() {
        assert_eq!(OrderStatus::from("OUT_FOR_DELIVERY").label(), "Out For Delivery");
    }
}
