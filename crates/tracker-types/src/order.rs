//! Order records tracked by the service.
//!
//! An order is keyed by its `order_id` and only its `status` may change after
//! creation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle status of an order.
///
/// Serialized in lowercase (`"pending"`, `"processing"`, `"shipped"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
	/// Order has been received but not worked on yet.
	#[default]
	Pending,
	/// Order is being prepared.
	Processing,
	/// Order has left the warehouse.
	Shipped,
}

impl OrderStatus {
	/// Every valid status, in lifecycle order.
	pub const ALL: [OrderStatus; 3] = [
		OrderStatus::Pending,
		OrderStatus::Processing,
		OrderStatus::Shipped,
	];

	/// Returns the wire representation of the status.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "pending",
			OrderStatus::Processing => "processing",
			OrderStatus::Shipped => "shipped",
		}
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Returned when a string does not name one of the valid statuses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Status '{0}' is not a valid status.")]
pub struct ParseStatusError(pub String);

impl FromStr for OrderStatus {
	type Err = ParseStatusError;

	/// Parses a status. Matching is exact and case-sensitive.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		OrderStatus::ALL
			.into_iter()
			.find(|status| status.as_str() == s)
			.ok_or_else(|| ParseStatusError(s.to_string()))
	}
}

/// A stored customer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
	/// Unique identifier, also used as the storage key.
	pub order_id: String,
	/// Name of the ordered item.
	pub item_name: String,
	/// Number of items ordered.
	pub quantity: u32,
	/// Identifier of the customer who placed the order.
	pub customer_id: String,
	/// Current status.
	pub status: OrderStatus,
}

/// Input for creating an order.
///
/// `status` is kept as raw text so the tracker can report the offending value
/// when it is not a valid status. `None` means `pending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
	pub order_id: String,
	pub item_name: String,
	pub quantity: u32,
	pub customer_id: String,
	pub status: Option<String>,
}

impl NewOrder {
	/// Creates order input with the default status.
	pub fn new(
		order_id: impl Into<String>,
		item_name: impl Into<String>,
		quantity: u32,
		customer_id: impl Into<String>,
	) -> Self {
		Self {
			order_id: order_id.into(),
			item_name: item_name.into(),
			quantity,
			customer_id: customer_id.into(),
			status: None,
		}
	}

	/// Sets an explicit initial status.
	pub fn with_status(mut self, status: impl Into<String>) -> Self {
		self.status = Some(status.into());
		self
	}
}
