//! Region geometry and field addressing
//!
//! The store occupies one contiguous region of persistent memory:
//!
//! ```text
//! base_offset + 0              magic (u8)
//! base_offset + 1              count (u8)
//! base_offset + 2              id[total_users]        (u32 LE each)
//!                              pwd[total_users]       (u32 LE each)
//!                              name[total_users]      (max_name_length bytes each)
//!                              attribute[total_users] (u8 each)
//!                              timestamp[total_users] (u32 LE each)
//! ```
//!
//! Tables are column-major, so a single field can be scanned without
//! touching the others.

use tracing::warn;

use crate::error::{StoreError, StoreResult};

/// Magic byte marking an initialized region
pub const MAGIC: u8 = 0x75;

/// Magic byte plus count byte
pub const HEADER_SIZE: usize = 2;

/// Bytes per record excluding the name buffer: id + pwd + attribute + timestamp
pub const FIXED_RECORD_SIZE: usize = 4 + 4 + 1 + 4;

/// Upper bound on capacity, since `count` is stored in a single byte
pub const MAX_USERS: usize = u8::MAX as usize;

/// Immutable description of where and how large the region is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    total_users: u8,
    base_offset: usize,
    max_name_length: u8,
    storage_size: Option<usize>,
}

impl Geometry {
    /// Geometry with an explicit record capacity
    pub fn new(total_users: u8, base_offset: usize, max_name_length: u8) -> Self {
        Geometry {
            total_users,
            base_offset,
            max_name_length,
            storage_size: None,
        }
    }

    /// Geometry whose capacity is derived from the storage available
    /// between `base_offset` and `storage_size`
    pub fn from_storage_size(
        storage_size: usize,
        base_offset: usize,
        max_name_length: u8,
    ) -> StoreResult<Self> {
        let available = storage_size
            .checked_sub(base_offset)
            .and_then(|n| n.checked_sub(HEADER_SIZE))
            .ok_or_else(|| {
                StoreError::Geometry(format!(
                    "base offset {} leaves no room for the header in {} bytes",
                    base_offset, storage_size
                ))
            })?;

        let record_size = FIXED_RECORD_SIZE + max_name_length as usize;
        let mut users = available / record_size;
        if users > MAX_USERS {
            warn!(derived = users, "capacity clamped to {}", MAX_USERS);
            users = MAX_USERS;
        }
        if users == 0 {
            warn!(storage_size, base_offset, "storage too small for a single record");
        }

        Ok(Geometry {
            total_users: users as u8,
            base_offset,
            max_name_length,
            storage_size: Some(storage_size),
        })
    }

    /// Maximum number of records
    pub fn total_users(&self) -> u8 {
        self.total_users
    }

    /// Start of the region in the backing store
    pub fn base_offset(&self) -> usize {
        self.base_offset
    }

    /// Width of each name buffer; zero disables names
    pub fn max_name_length(&self) -> u8 {
        self.max_name_length
    }

    /// Storage size the capacity was derived from, if any
    pub fn storage_size(&self) -> Option<usize> {
        self.storage_size
    }

    /// Bytes consumed by one record across all tables
    pub fn record_size(&self) -> usize {
        FIXED_RECORD_SIZE + self.max_name_length as usize
    }

    /// Bytes consumed by the whole region, header included
    pub fn db_size(&self) -> usize {
        HEADER_SIZE + self.total_users as usize * self.record_size()
    }

    /// One past the last byte of the region
    pub fn end_offset(&self) -> usize {
        self.base_offset + self.db_size()
    }

    pub fn magic_offset(&self) -> usize {
        self.base_offset
    }

    pub fn count_offset(&self) -> usize {
        self.base_offset + 1
    }

    pub fn id_offset(&self, index: usize) -> usize {
        self.base_offset + HEADER_SIZE + 4 * index
    }

    pub fn pwd_offset(&self, index: usize) -> usize {
        self.id_offset(self.total_users as usize) + 4 * index
    }

    pub fn name_offset(&self, index: usize) -> usize {
        self.pwd_offset(self.total_users as usize) + self.max_name_length as usize * index
    }

    pub fn attribute_offset(&self, index: usize) -> usize {
        self.name_offset(self.total_users as usize) + index
    }

    pub fn timestamp_offset(&self, index: usize) -> usize {
        self.attribute_offset(self.total_users as usize) + 4 * index
    }
}
