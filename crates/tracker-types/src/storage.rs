//! Storage-related types for the order tracker.

/// Storage namespaces.
///
/// Every stored record lives under a namespace; the backend key is
/// `<namespace>:<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Order records keyed by order id.
	Orders,
}

impl StorageKey {
	/// Returns the string representation of the storage key.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Orders => "orders",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_orders_namespace() {
		assert_eq!(StorageKey::Orders.as_str(), "orders");
	}
}
