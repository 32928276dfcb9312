//! Request handling for the order tracker HTTP API.

pub mod order;
