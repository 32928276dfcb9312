//! Common types module for the order tracker.
//!
//! This module defines the core data types shared by every tracker crate:
//! the order record and its status values, storage namespaces, HTTP payloads,
//! and the configuration-schema primitives used by pluggable backends.

/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Order records and status values.
pub mod order;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Storage namespace keys.
pub mod storage;
/// Configuration validation types for backend configuration tables.
pub mod validation;

pub use api::*;
pub use order::*;
pub use registry::ImplementationRegistry;
pub use storage::*;
pub use validation::*;
