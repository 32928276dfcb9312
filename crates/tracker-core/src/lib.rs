//! Core order tracking logic.
//!
//! The [`OrderTracker`] owns the business rules for orders (unique ids, the
//! closed set of status values, existence checks before mutation) and sits on
//! top of a pluggable [`StorageService`](tracker_storage::StorageService).
//! [`TrackerBuilder`] composes a tracker from configuration and storage
//! factories.

use thiserror::Error;

pub mod builder;
pub mod tracker;

pub use builder::{BuilderError, TrackerBuilder};
pub use tracker::OrderTracker;

/// Errors returned by tracker operations.
#[derive(Debug, Error)]
pub enum TrackerError {
	/// An order with the same id is already stored.
	#[error("Order with ID '{0}' already exists.")]
	DuplicateOrder(String),
	/// A status value outside `pending | processing | shipped`.
	#[error("Status '{0}' is not a valid status.")]
	InvalidStatus(String),
	/// The referenced order is not stored.
	#[error("Order with ID '{0}' does not exist.")]
	OrderNotFound(String),
	/// A quantity of zero.
	#[error("Quantity must be a positive integer, got {0}.")]
	InvalidQuantity(u32),
	/// The storage backend failed.
	#[error("Storage error: {0}")]
	Storage(String),
}

impl From<tracker_storage::StorageError> for TrackerError {
	fn from(err: tracker_storage::StorageError) -> Self {
		TrackerError::Storage(err.to_string())
	}
}
