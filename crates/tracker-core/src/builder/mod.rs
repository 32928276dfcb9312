//! Builder for constructing an order tracker from configuration.
//!
//! Storage backends are created through factory functions keyed by the name
//! they are configured under, so new backends plug in without touching the
//! tracker itself.

use crate::OrderTracker;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracker_config::Config;
use tracker_storage::{StorageError, StorageInterface, StorageService};

/// Errors that can occur during tracker construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
}

/// Builder for constructing an [`OrderTracker`] with a pluggable storage backend.
pub struct TrackerBuilder {
	config: Config,
}

impl TrackerBuilder {
	/// Creates a new TrackerBuilder with the given configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the tracker on the primary storage implementation.
	///
	/// The backend is created by its factory and its configuration is checked
	/// again against the schema the backend reports.
	pub fn build<SF>(
		self,
		storage_factories: HashMap<String, SF>,
	) -> Result<OrderTracker, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
	{
		let primary_storage = &self.config.storage.primary;

		let config = self
			.config
			.storage
			.implementations
			.get(primary_storage)
			.ok_or_else(|| {
				BuilderError::Config(format!(
					"Primary storage '{}' is not configured",
					primary_storage
				))
			})?;

		let factory = storage_factories.get(primary_storage).ok_or_else(|| {
			BuilderError::Config(format!(
				"Primary storage '{}' has no registered implementation",
				primary_storage
			))
		})?;

		let storage_backend = match factory(config) {
			Ok(implementation) => implementation,
			Err(e) => {
				tracing::error!(
					component = "storage",
					implementation = %primary_storage,
					error = %e,
					"Failed to create storage implementation"
				);
				return Err(BuilderError::Config(format!(
					"Failed to create storage implementation '{}': {}",
					primary_storage, e
				)));
			},
		};

		if let Err(e) = storage_backend.config_schema().validate(config) {
			tracing::error!(
				component = "storage",
				implementation = %primary_storage,
				error = %e,
				"Invalid storage configuration"
			);
			return Err(BuilderError::Config(format!(
				"Invalid configuration for storage '{}': {}",
				primary_storage, e
			)));
		}

		tracing::info!(component = "storage", implementation = %primary_storage, enabled = true, "Loaded");
		tracing::info!(tracker_id = %self.config.tracker.id, storage = %primary_storage, "Tracker ready");
		Ok(OrderTracker::new(Arc::new(StorageService::new(
			storage_backend,
		))))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tracker_storage::implementations::memory;
	use tracker_storage::{get_all_implementations, StorageFactory};
	use async_trait::async_trait;
	use tracker_storage::implementations::memory::MemoryStorage;
	use tracker_types::{
		ConfigSchema, Field, FieldType, ImplementationRegistry, NewOrder, Schema, ValidationError,
	};

	/// Memory backend whose schema demands a `region` key its factory ignores.
	struct RegionalStorage(MemoryStorage);

	struct RegionalSchema;

	impl ConfigSchema for RegionalSchema {
		fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
			Schema::new(vec![Field::new("region", FieldType::String)], vec![]).validate(config)
		}
	}

	#[async_trait]
	impl StorageInterface for RegionalStorage {
		async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
			self.0.get_bytes(key).await
		}

		async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
			self.0.set_bytes(key, value).await
		}

		async fn delete(&self, key: &str) -> Result<(), StorageError> {
			self.0.delete(key).await
		}

		async fn exists(&self, key: &str) -> Result<bool, StorageError> {
			self.0.exists(key).await
		}

		async fn list(&self, namespace: &str) -> Result<Vec<(String, Vec<u8>)>, StorageError> {
			self.0.list(namespace).await
		}

		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			Box::new(RegionalSchema)
		}
	}

	fn create_regional(_config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
		Ok(Box::new(RegionalStorage(MemoryStorage::new())))
	}

	fn config(primary: &str, implementations: &str) -> Config {
		format!(
			"[tracker]\nid = \"test\"\n\n[storage]\nprimary = \"{}\"\n{}",
			primary, implementations
		)
		.parse()
		.unwrap()
	}

	fn all_factories() -> HashMap<String, StorageFactory> {
		get_all_implementations()
			.into_iter()
			.map(|(name, factory)| (name.to_string(), factory))
			.collect()
	}

	#[tokio::test]
	async fn test_build_with_memory_storage() {
		let tracker = TrackerBuilder::new(config("memory", "[storage.implementations.memory]"))
			.build(all_factories())
			.unwrap();

		tracker.add(NewOrder::new("A1", "Pen", 1, "C1")).await.unwrap();
		assert!(tracker.get("A1").await.unwrap().is_some());
	}

	#[test]
	fn test_build_fails_when_primary_has_no_factory() {
		let mut factories = HashMap::new();
		factories.insert(memory::Registry::NAME.to_string(), memory::Registry::factory());

		let result = TrackerBuilder::new(config(
			"file",
			"[storage.implementations.memory]\n[storage.implementations.file]",
		))
		.build(factories);

		let err = result.err().unwrap();
		assert!(err.to_string().contains("Primary storage 'file'"));
	}

	#[test]
	fn test_build_fails_without_any_factory() {
		let result = TrackerBuilder::new(config("memory", "[storage.implementations.memory]"))
			.build(HashMap::<String, StorageFactory>::new());
		assert!(matches!(result, Err(BuilderError::Config(_))));
	}

	#[test]
	fn test_build_fails_on_invalid_backend_config() {
		let result = TrackerBuilder::new(config(
			"file",
			"[storage.implementations.file]\nstorage_path = 42",
		))
		.build(all_factories());

		let err = result.err().unwrap();
		assert!(err.to_string().contains("'file'"));
	}

	#[test]
	fn test_only_primary_backend_is_built() {
		let result = TrackerBuilder::new(config(
			"memory",
			"[storage.implementations.memory]\n[storage.implementations.file]\nstorage_path = 42",
		))
		.build(all_factories());
		assert!(result.is_ok());
	}

	#[test]
	fn test_backend_schema_checked_after_creation() {
		let mut factories: HashMap<String, StorageFactory> = HashMap::new();
		factories.insert("regional".to_string(), create_regional);

		let result = TrackerBuilder::new(config("regional", "[storage.implementations.regional]"))
			.build(factories.clone());
		let err = result.err().unwrap();
		assert!(
			err.to_string().contains("Invalid configuration for storage 'regional'"),
			"unexpected error: {}",
			err
		);

		let result = TrackerBuilder::new(config(
			"regional",
			"[storage.implementations.regional]\nregion = \"eu\"",
		))
		.build(factories);
		assert!(result.is_ok());
	}
}
