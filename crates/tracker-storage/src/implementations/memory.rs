//! In-memory storage backend.
//!
//! Data lives in a `HashMap` for the lifetime of the process and is lost on
//! restart.

use crate::{StorageError, StorageFactory, StorageInterface, StorageRegistry};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracker_types::{ConfigSchema, ImplementationRegistry, Schema, ValidationError};

/// In-memory storage implementation.
pub struct MemoryStorage {
	/// The in-memory store protected by a read-write lock.
	store: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
	/// Creates a new, empty MemoryStorage instance.
	pub fn new() -> Self {
		Self {
			store: Arc::new(RwLock::new(HashMap::new())),
		}
	}

	/// Removes every stored entry.
	pub async fn clear(&self) {
		self.store.write().await.clear();
	}
}

impl Default for MemoryStorage {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl StorageInterface for MemoryStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let store = self.store.read().await;
		store.get(key).cloned().ok_or(StorageError::NotFound)
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let mut store = self.store.write().await;
		store.insert(key.to_string(), value);
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let mut store = self.store.write().await;
		store.remove(key);
		Ok(())
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let store = self.store.read().await;
		Ok(store.contains_key(key))
	}

	async fn list(&self, namespace: &str) -> Result<Vec<(String, Vec<u8>)>, StorageError> {
		let prefix = format!("{}:", namespace);
		let store = self.store.read().await;
		Ok(store
			.iter()
			.filter_map(|(key, value)| {
				key.strip_prefix(&prefix)
					.map(|id| (id.to_string(), value.clone()))
			})
			.collect())
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryStorageSchema)
	}
}

/// Configuration schema for MemoryStorage.
pub struct MemoryStorageSchema;

impl ConfigSchema for MemoryStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// No options; only the table shape is checked.
		Schema::new(vec![], vec![]).validate(config)
	}
}

/// Factory function to create a memory storage backend from configuration.
///
/// Configuration parameters:
/// - None required for memory storage
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	MemoryStorageSchema
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;

	Ok(Box::new(MemoryStorage::new()))
}

/// Registry for the memory storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl StorageRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_basic_operations() {
		let storage = MemoryStorage::new();

		let key = "orders:A1";
		let value = b"test_value".to_vec();
		storage.set_bytes(key, value.clone()).await.unwrap();

		assert_eq!(storage.get_bytes(key).await.unwrap(), value);
		assert!(storage.exists(key).await.unwrap());

		storage.delete(key).await.unwrap();
		assert!(!storage.exists(key).await.unwrap());

		let result = storage.get_bytes(key).await;
		assert!(matches!(result, Err(StorageError::NotFound)));

		// Deleting again is a no-op.
		storage.delete(key).await.unwrap();
	}

	#[tokio::test]
	async fn test_overwrite() {
		let storage = MemoryStorage::new();

		storage.set_bytes("orders:A1", b"value1".to_vec()).await.unwrap();
		storage.set_bytes("orders:A1", b"value2".to_vec()).await.unwrap();

		assert_eq!(storage.get_bytes("orders:A1").await.unwrap(), b"value2");
	}

	#[tokio::test]
	async fn test_list_strips_namespace() {
		let storage = MemoryStorage::new();
		storage.set_bytes("orders:A1", b"1".to_vec()).await.unwrap();
		storage.set_bytes("orders:B:2", b"2".to_vec()).await.unwrap();
		storage.set_bytes("ordersX:C3", b"3".to_vec()).await.unwrap();

		let mut listed = storage.list("orders").await.unwrap();
		listed.sort();
		assert_eq!(
			listed,
			vec![
				("A1".to_string(), b"1".to_vec()),
				("B:2".to_string(), b"2".to_vec()),
			]
		);
	}

	#[tokio::test]
	async fn test_clear() {
		let storage = MemoryStorage::new();
		storage.set_bytes("orders:A1", b"1".to_vec()).await.unwrap();
		storage.clear().await;
		assert!(storage.list("orders").await.unwrap().is_empty());
	}

	#[test]
	fn test_factory_rejects_non_table_config() {
		assert!(create_storage(&toml::Value::Table(Default::default())).is_ok());

		let result = create_storage(&toml::Value::String("memory".into()));
		assert!(matches!(result, Err(StorageError::Configuration(_))));
	}
}
