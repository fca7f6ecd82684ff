//! Order payloads as they travel to and from the order-processing service.
//!
//! Field names follow the service's camelCase JSON (`customerId`, `deliveryAddress`, ...).
use crate::model::{ItemStatus, OrderStatus};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;

/// Identifier assigned to an order by the order-processing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single product line of an [`OrderRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_code: i64,
    pub quantity: u32,
}

impl OrderLine {
    pub fn new(product_code: i64, quantity: u32) -> Self {
        Self {
            product_code,
            quantity,
        }
    }
}

/// Payload for submitting a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub customer_id: i64,
    pub delivery_address: String,
    pub items: Vec<OrderLine>,
}

impl OrderRequest {
    /// Creates a new OrderRequest.
    ///
    /// # Arguments
    /// * `customer_id` - Customer placing the order
    /// * `delivery_address` - Free-form shipping address
    /// * `items` - Ordered product lines, at least one
    pub fn new(customer_id: i64, delivery_address: impl Into<String>, items: Vec<OrderLine>) -> Self {
        Self {
            customer_id,
            delivery_address: delivery_address.into(),
            items,
        }
    }

    /// Checks the request before it is sent anywhere.
    ///
    /// # Errors
    /// Returns a description of the first problem found: blank address,
    /// no items, or an item with quantity zero.
    pub fn validate(&self) -> Result<(), String> {
        if self.delivery_address.trim().is_empty() {
            return Err("delivery address must not be empty".to_string());
        }
        if self.items.is_empty() {
            return Err("order must contain at least one item".to_string());
        }
        if let Some(line) = self.items.iter().find(|line| line.quantity == 0) {
            return Err(format!(
                "quantity for product {} must be at least 1",
                line.product_code
            ));
        }
        Ok(())
    }
}

/// One order line as reported back by the service, with reservation details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
    #[serde(deserialize_with = "product_code")]
    pub product_code: i64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_status: Option<ItemStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fulfilled_by_warehouse_id: Option<i64>,
}

/// The service's current view of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    /// `0` when the service sends no customer.
    #[serde(default, deserialize_with = "null_as_default")]
    pub customer_id: i64,
    /// Empty when the service sends no address.
    #[serde(default, deserialize_with = "null_as_default")]
    pub delivery_address: String,
    pub status: OrderStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<OrderItemView>,
}

// Display-only fields are nullable on the service side.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// The service stores product codes as strings; the request side sends numbers.
fn product_code<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Number(i64),
        Text(String),
    }

    match Code::deserialize(deserializer)? {
        Code::Number(code) => Ok(code),
        Code::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}
