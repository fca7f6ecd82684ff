use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Lifecycle status of an order as reported by the order-processing service.
///
/// The service may grow new states (it already emits `ASSIGNED` and `DELIVERED`
/// in some deployments). Anything not modelled here is carried as
/// [`OrderStatus::Other`] with the exact wire token, so a newer service never
/// breaks deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Received,
    StockReserved,
    ScheduledForDelivery,
    Failed,
    Other(String),
}

impl OrderStatus {
    /// The SCREAMING_SNAKE token used on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Received => "RECEIVED",
            OrderStatus::StockReserved => "STOCK_RESERVED",
            OrderStatus::ScheduledForDelivery => "SCHEDULED_FOR_DELIVERY",
            OrderStatus::Failed => "FAILED",
            OrderStatus::Other(token) => token,
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(token: &str) -> Self {
        match token {
            "RECEIVED" => OrderStatus::Received,
            "STOCK_RESERVED" => OrderStatus::StockReserved,
            "SCHEDULED_FOR_DELIVERY" => OrderStatus::ScheduledForDelivery,
            "FAILED" => OrderStatus::Failed,
            other => OrderStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(token: String) -> Self {
        OrderStatus::from(token.as_str())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Other(token) => token,
            known => known.as_str().to_string(),
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reservation state of a single order line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemStatus {
    Pending,
    Reserved,
    NotAvailable,
    /// Item ships from a secondary warehouse.
    SplitShipment,
    Other(String),
}

impl ItemStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ItemStatus::Pending => "PENDING",
            ItemStatus::Reserved => "RESERVED",
            ItemStatus::NotAvailable => "NOT_AVAILABLE",
            ItemStatus::SplitShipment => "SPLIT_SHIPMENT",
            ItemStatus::Other(token) => token,
        }
    }
}

impl From<String> for ItemStatus {
    fn from(token: String) -> Self {
        match token.as_str() {
            "PENDING" => ItemStatus::Pending,
            "RESERVED" => ItemStatus::Reserved,
            "NOT_AVAILABLE" => ItemStatus::NotAvailable,
            "SPLIT_SHIPMENT" => ItemStatus::SplitShipment,
            _ => ItemStatus::Other(token),
        }
    }
}

impl From<ItemStatus> for String {
    fn from(status: ItemStatus) -> Self {
        match status {
            ItemStatus::Other(token) => token,
            known => known.as_str().to_string(),
        }
    }
}

impl Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
