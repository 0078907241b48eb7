//! Order Records

use std::str::FromStr;

use jiff::Timestamp;
use thiserror::Error;

use crate::uuids::TypedUuid;

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order Record
///
/// `customer_name` attributes the order to a customer by exact name match;
/// orders reference no live product rows, so catalog soft-deletes never
/// disturb order history.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub customer_name: String,
    pub placed_at: Timestamp,
    pub total: f64,
    pub status: OrderStatus,
    pub items: Vec<OrderLine>,
}

/// A line item, capturing the unit price at the time of the order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

/// Order status.
///
/// `Pending → Completed` is the one admin-triggered transition;
/// `Pending → Cancelled` is terminal. Completed and Cancelled accept no
/// further transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Error parsing an order status from its stored text form.
#[derive(Debug, Error)]
#[error("unknown order status: {0}")]
pub struct UnknownOrderStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownOrderStatus(other.to_string())),
        }
    }
}
