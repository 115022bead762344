//! # redpaste store
//!
//! Key-value store trait and implementations for redpaste.
//!
//! The sync engine needs exactly two commands from its store: a ranged read
//! of a string value and an overwrite with optional expiry. This crate
//! defines that surface and nothing more.
//!
//! ## Design Principles
//!
//! - Stores are opaque byte slots; they never interpret records
//! - No retries and no timeouts beyond what the client is configured with
//! - Must be `Send + Sync` for use from blocking worker threads
//!
//! ## Available Stores
//!
//! - [`InMemoryStore`] - For testing
//! - [`RedisStore`] - For a Redis server, using the `redis` crate
//!
//! ## Example
//!
//! ```rust
//! use redpaste_store::{InMemoryStore, KeyValueStore};
//! use std::time::Duration;
//!
//! let store = InMemoryStore::new();
//! store.set_with_ttl("clip", "0123456789", Duration::ZERO).unwrap();
//! assert_eq!(store.get_range("clip", 0, 3).unwrap(), b"0123");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod memory;
mod redis_store;

pub use backend::KeyValueStore;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use redis_store::RedisStore;
