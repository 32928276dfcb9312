//! Order lifecycle management.
//!
//! Every mutation checks its preconditions before touching storage, so a
//! failed call never leaves a partial write behind.

use crate::TrackerError;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracker_storage::StorageService;
use tracker_types::{NewOrder, Order, OrderStatus, StorageKey};

/// Manages order records stored in a [`StorageService`].
pub struct OrderTracker {
	storage: Arc<StorageService>,
	/// Held across check-then-write sequences so concurrent requests cannot
	/// interleave between the existence check and the write.
	write_lock: Mutex<()>,
}

impl OrderTracker {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self {
			storage,
			write_lock: Mutex::new(()),
		}
	}

	/// Adds a new order.
	///
	/// Checks run in order: duplicate id, status value (defaults to
	/// `pending`), quantity. Returns the stored record.
	pub async fn add(&self, new_order: NewOrder) -> Result<Order, TrackerError> {
		let _guard = self.write_lock.lock().await;

		if self
			.storage
			.exists(StorageKey::Orders.as_str(), &new_order.order_id)
			.await?
		{
			return Err(TrackerError::DuplicateOrder(new_order.order_id));
		}

		let status = match new_order.status.as_deref() {
			Some(value) => parse_status(value)?,
			None => OrderStatus::default(),
		};

		if new_order.quantity == 0 {
			return Err(TrackerError::InvalidQuantity(new_order.quantity));
		}

		let order = Order {
			order_id: new_order.order_id,
			item_name: new_order.item_name,
			quantity: new_order.quantity,
			customer_id: new_order.customer_id,
			status,
		};

		self.storage
			.store(StorageKey::Orders.as_str(), &order.order_id, &order)
			.await?;

		tracing::info!(order_id = %order.order_id, status = %order.status, "Order added");
		Ok(order)
	}

	/// Returns the order stored under `order_id`, if any.
	pub async fn get(&self, order_id: &str) -> Result<Option<Order>, TrackerError> {
		Ok(self
			.storage
			.try_retrieve(StorageKey::Orders.as_str(), order_id)
			.await?)
	}

	/// Changes the status of an existing order and returns the updated record.
	///
	/// Existence is checked before the status value.
	pub async fn update_status(
		&self,
		order_id: &str,
		new_status: &str,
	) -> Result<Order, TrackerError> {
		let _guard = self.write_lock.lock().await;

		let mut order: Order = self
			.storage
			.try_retrieve(StorageKey::Orders.as_str(), order_id)
			.await?
			.ok_or_else(|| TrackerError::OrderNotFound(order_id.to_string()))?;

		let status = parse_status(new_status)?;
		let previous = order.status;
		order.status = status;

		self.storage
			.store(StorageKey::Orders.as_str(), order_id, &order)
			.await?;

		tracing::info!(
			order_id = %order_id,
			from = %previous,
			to = %status,
			"Order status updated"
		);
		Ok(order)
	}

	/// Returns every stored order sorted by id.
	pub async fn list_all(&self) -> Result<Vec<Order>, TrackerError> {
		let mut orders: Vec<Order> = self
			.storage
			.retrieve_all::<Order>(StorageKey::Orders.as_str())
			.await?
			.into_iter()
			.map(|(_, order)| order)
			.collect();
		orders.sort_by(|a, b| a.order_id.cmp(&b.order_id));
		tracing::debug!(count = orders.len(), "Listed orders");
		Ok(orders)
	}

	/// Returns the orders whose status equals `status` exactly.
	///
	/// Unknown values match nothing.
	pub async fn list_by_status(&self, status: &str) -> Result<Vec<Order>, TrackerError> {
		let orders = self.list_all().await?;
		Ok(orders
			.into_iter()
			.filter(|order| order.status.as_str() == status)
			.collect())
	}

	/// Deletes an existing order.
	pub async fn delete(&self, order_id: &str) -> Result<(), TrackerError> {
		let _guard = self.write_lock.lock().await;

		if !self
			.storage
			.exists(StorageKey::Orders.as_str(), order_id)
			.await?
		{
			return Err(TrackerError::OrderNotFound(order_id.to_string()));
		}

		self.storage
			.remove(StorageKey::Orders.as_str(), order_id)
			.await?;

		tracing::info!(order_id = %order_id, "Order deleted");
		Ok(())
	}
}

fn parse_status(value: &str) -> Result<OrderStatus, TrackerError> {
	value
		.parse::<OrderStatus>()
		.map_err(|e| TrackerError::InvalidStatus(e.0))
}
