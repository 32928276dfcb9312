//! File-based storage backend.
//!
//! Each key is stored as one JSON file under a base directory. The file name is
//! `<namespace>_<hex(id)>.json`, which keeps arbitrary ids filesystem-safe and
//! lets [`StorageInterface::list`] recover the original id.
//!
//! Ids whose hex form would make the name too long are stored as
//! `<namespace>_sha3-<hex(sha3_256(id))>.json` instead. Those files start with
//! a `<hex(id)>\n` header so the id can still be recovered.

use crate::{StorageError, StorageFactory, StorageInterface, StorageRegistry};
use async_trait::async_trait;
use sha3::{Digest, Sha3_256};
use std::path::PathBuf;
use tokio::fs;
use tracker_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError};

/// Directory used when `storage_path` is not configured.
const DEFAULT_STORAGE_PATH: &str = "./data/storage";

/// Extension of stored record files.
const FILE_EXTENSION: &str = "json";

/// Longest hex-encoded id kept verbatim in a file name.
const MAX_ENCODED_ID_LEN: usize = 128;

/// Prefix of file name stems derived from an id digest.
const DIGEST_MARKER: &str = "sha3-";

/// What a record file name says about the id stored in it.
#[derive(Debug, PartialEq, Eq)]
enum StoredName {
	/// The id is encoded in the name.
	Id(String),
	/// The id is in the file header.
	Digest,
}

/// File-based storage implementation.
pub struct FileStorage {
	/// Base directory path for storing files.
	base_path: PathBuf,
}

impl FileStorage {
	/// Creates a new FileStorage rooted at `base_path`. The directory is created
	/// on first write.
	pub fn new(base_path: impl Into<PathBuf>) -> Self {
		Self {
			base_path: base_path.into(),
		}
	}

	/// Maps `<namespace>:<id>` to its file path.
	fn get_file_path(&self, key: &str) -> PathBuf {
		let (namespace, id) = split_key(key);
		let stem = if uses_digest(id) {
			format!(
				"{}{}",
				DIGEST_MARKER,
				hex::encode(Sha3_256::digest(id.as_bytes()))
			)
		} else {
			hex::encode(id)
		};
		self.base_path
			.join(format!("{}_{}.{}", namespace, stem, FILE_EXTENSION))
	}

	/// Classifies a file name if it belongs to `namespace`.
	fn parse_file_name(namespace: &str, file_name: &str) -> Option<StoredName> {
		let stem = file_name
			.strip_suffix(FILE_EXTENSION)?
			.strip_suffix('.')?
			.strip_prefix(namespace)?
			.strip_prefix('_')?;
		if let Some(digest) = stem.strip_prefix(DIGEST_MARKER) {
			return hex::decode(digest).ok().map(|_| StoredName::Digest);
		}
		let bytes = hex::decode(stem).ok()?;
		String::from_utf8(bytes).ok().map(StoredName::Id)
	}
}

fn split_key(key: &str) -> (&str, &str) {
	key.split_once(':').unwrap_or((key, ""))
}

fn uses_digest(id: &str) -> bool {
	id.len() * 2 > MAX_ENCODED_ID_LEN
}

/// Splits a digest-named file into its id header and record bytes.
fn split_header(data: &[u8]) -> Option<(String, &[u8])> {
	let newline = data.iter().position(|b| *b == b'\n')?;
	let id = String::from_utf8(hex::decode(&data[..newline]).ok()?).ok()?;
	Some((id, &data[newline + 1..]))
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.get_file_path(key);

		let data = match fs::read(&path).await {
			Ok(data) => data,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(StorageError::NotFound),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		let (_, id) = split_key(key);
		if !uses_digest(id) {
			return Ok(data);
		}
		match split_header(&data) {
			Some((stored_id, record)) if stored_id == id => Ok(record.to_vec()),
			Some(_) => Err(StorageError::NotFound),
			None => Err(StorageError::Backend(format!(
				"Missing id header in {}",
				path.display()
			))),
		}
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let path = self.get_file_path(key);

		fs::create_dir_all(&self.base_path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		let (_, id) = split_key(key);
		let contents = if uses_digest(id) {
			let mut contents = hex::encode(id).into_bytes();
			contents.push(b'\n');
			contents.extend_from_slice(&value);
			contents
		} else {
			value
		};

		// Write to a temp file then rename so readers never see a partial record.
		let temp_path = path.with_extension("json.tmp");
		fs::write(&temp_path, contents)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let path = self.get_file_path(key);

		match fs::remove_file(&path).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let path = self.get_file_path(key);
		fs::try_exists(&path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))
	}

	async fn list(&self, namespace: &str) -> Result<Vec<(String, Vec<u8>)>, StorageError> {
		let mut entries = match fs::read_dir(&self.base_path).await {
			Ok(entries) => entries,
			// Nothing written yet.
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		let mut records = Vec::new();
		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let file_name = entry.file_name();
			let Some(stored_name) = file_name
				.to_str()
				.and_then(|name| Self::parse_file_name(namespace, name))
			else {
				continue;
			};

			match fs::read(entry.path()).await {
				Ok(data) => match stored_name {
					StoredName::Id(id) => records.push((id, data)),
					StoredName::Digest => match split_header(&data) {
						Some((id, record)) => records.push((id, record.to_vec())),
						None => {
							tracing::warn!("Skipping {:?}: missing id header", entry.path());
						},
					},
				},
				// Removed between read_dir and read.
				Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
					tracing::debug!("Skipping {:?}: removed during listing", entry.path());
				},
				Err(e) => return Err(StorageError::Backend(e.to_string())),
			}
		}

		Ok(records)
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStorageSchema)
	}
}

/// Configuration schema for FileStorage.
pub struct FileStorageSchema;

impl ConfigSchema for FileStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![
				Field::new("storage_path", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(path) if path.trim().is_empty() => {
							Err("storage_path cannot be empty".to_string())
						},
						_ => Ok(()),
					}
				}),
			],
		);

		schema.validate(config)
	}
}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for record files (default: "./data/storage")
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	FileStorageSchema
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;

	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or(DEFAULT_STORAGE_PATH);

	tracing::debug!(component = "storage", path = %storage_path, "Using file storage");
	Ok(Box::new(FileStorage::new(storage_path)))
}

/// Registry for the file storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl StorageRegistry for Registry {}
