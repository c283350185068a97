//! Storage layer for the credential region
//!
//! This module handles the low-level side of the store:
//! - Region geometry and field offsets
//! - The persistent memory capability and its implementations
//! - Slot positions and record snapshots

pub mod layout;
pub mod memory;
pub mod file;
pub mod record;

pub use layout::{Geometry, MAGIC};
pub use memory::{MemoryStore, PersistentMemory, WriteMode};
pub use file::FileStore;
pub use record::{Position, Record, PWDFLAG, PWDMASK};
