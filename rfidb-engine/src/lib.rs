//! rfidb Engine - access-control credential store for persistent memory
//!
//! This crate keeps a fixed number of credential records (identifier,
//! password, name, permission byte, timestamp) in a byte-addressable,
//! EEPROM-style region, addressed by content rather than by index.

pub mod error;
pub mod config;
pub mod storage;
pub mod operations;

pub use config::StoreConfig;
pub use error::{StatusCode, StoreError, StoreResult};
pub use operations::RecordStore;
pub use storage::{FileStore, Geometry, MemoryStore, PersistentMemory, Position, Record, WriteMode};
