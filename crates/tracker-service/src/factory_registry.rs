//! Factory registry for pluggable implementations.
//!
//! Every backend crate lists its implementations through
//! `get_all_implementations()`; this module collects them once and resolves the
//! names used in the configuration file.

use std::collections::HashMap;
use std::sync::OnceLock;
use tracker_config::Config;
use tracker_core::{OrderTracker, TrackerBuilder};
use tracker_storage::StorageFactory;

/// Registry of every known implementation factory.
pub struct FactoryRegistry {
	pub storage: HashMap<String, StorageFactory>,
}

impl FactoryRegistry {
	/// Create a new empty registry
	pub fn new() -> Self {
		Self {
			storage: HashMap::new(),
		}
	}

	/// Register a storage implementation
	pub fn register_storage(&mut self, name: impl Into<String>, factory: StorageFactory) {
		self.storage.insert(name.into(), factory);
	}
}

impl Default for FactoryRegistry {
	fn default() -> Self {
		Self::new()
	}
}

static REGISTRY: OnceLock<FactoryRegistry> = OnceLock::new();

/// Get the global factory registry, populating it on first use.
pub fn get_registry() -> &'static FactoryRegistry {
	REGISTRY.get_or_init(|| {
		let mut registry = FactoryRegistry::new();

		for (name, factory) in tracker_storage::get_all_implementations() {
			tracing::debug!("Registering storage implementation: {}", name);
			registry.register_storage(name, factory);
		}

		registry
	})
}

/// Picks the factories named in a config section, failing on unknown names.
macro_rules! build_factories {
	($registry:expr, $config_impls:expr, $registry_field:ident, $type_name:literal) => {{
		let mut factories = HashMap::new();
		for name in $config_impls.keys() {
			if let Some(factory) = $registry.$registry_field.get(name) {
				factories.insert(name.clone(), *factory);
			} else {
				let mut available: Vec<_> = $registry.$registry_field.keys().cloned().collect();
				available.sort();
				return Err(format!(
					"Unknown {} implementation '{}'. Available: [{}]",
					$type_name,
					name,
					available.join(", ")
				)
				.into());
			}
		}
		factories
	}};
}

/// Build the tracker using the registry and config.
pub fn build_tracker_from_config(
	config: Config,
) -> Result<OrderTracker, Box<dyn std::error::Error>> {
	let registry = get_registry();

	let storage_factories =
		build_factories!(registry, config.storage.implementations, storage, "storage");

	Ok(TrackerBuilder::new(config).build(storage_factories)?)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_registry_contains_all_storage_backends() {
		let registry = get_registry();
		assert!(registry.storage.contains_key("memory"));
		assert!(registry.storage.contains_key("file"));
	}

	#[tokio::test]
	async fn test_build_tracker_from_config() {
		let config: Config = r#"
[tracker]
id = "registry-test"

[storage]
primary = "memory"
[storage.implementations.memory]
"#
		.parse()
		.unwrap();

		let tracker = build_tracker_from_config(config).unwrap();
		assert!(tracker.list_all().await.unwrap().is_empty());
	}

	#[test]
	fn test_unknown_implementation_rejected() {
		let config: Config = r#"
[tracker]
id = "registry-test"

[storage]
primary = "memory"
[storage.implementations.memory]
[storage.implementations.redis]
"#
		.parse()
		.unwrap();

		let err = build_tracker_from_config(config).err().unwrap();
		assert_eq!(
			err.to_string(),
			"Unknown storage implementation 'redis'. Available: [file, memory]"
		);
	}
}
