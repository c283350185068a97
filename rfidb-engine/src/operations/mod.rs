//! Record store operations
//!
//! `RecordStore` owns the backing memory and the region geometry. The
//! operations are split by concern:
//! - `lookup`: content addressed search by identifier or password
//! - `insert`: upserts and per-field writes keyed by content
//! - `remove`: detach, delete with compaction, name clearing
//! - `access`: positional reads and writes
//!
//! Every mutating operation ends with a flush of the backing memory.
//! Multi-field updates are not atomic: losing power part way through a
//! compaction can leave a duplicated or half-cleared slot behind.

pub mod lookup;
pub mod insert;
pub mod remove;
pub mod access;

use tracing::{info, warn};

use crate::config::StoreConfig;
use crate::error::{StatusCode, StoreError, StoreResult};
use crate::storage::layout::{Geometry, MAGIC};
use crate::storage::memory::PersistentMemory;

/// Zeroes written per call while wiping the region
const WIPE_CHUNK: usize = 64;

/// Fixed-capacity credential store living in persistent memory
pub struct RecordStore<M> {
    memory: M,
    geometry: Geometry,
}

impl<M: PersistentMemory> RecordStore<M> {
    /// Bind a geometry to a backing memory. Nothing is read or written
    /// until `begin` or `init_db`.
    pub fn new(memory: M, geometry: Geometry) -> StoreResult<Self> {
        if geometry.end_offset() > memory.capacity() {
            return Err(StoreError::Geometry(format!(
                "region ends at {} but memory holds {} bytes",
                geometry.end_offset(),
                memory.capacity()
            )));
        }
        Ok(RecordStore { memory, geometry })
    }

    /// Build from a configuration
    pub fn from_config(memory: M, config: &StoreConfig) -> StoreResult<Self> {
        let geometry = config.to_geometry()?;
        Self::new(memory, geometry)
    }

    /// Initialize the region unless it already carries the magic byte.
    /// Returns true when the region was (re)initialized.
    pub fn begin(&mut self) -> StoreResult<bool> {
        if !self.has_magic()? {
            self.init_db()?;
            return Ok(true);
        }

        let count = self.count()?;
        if count > self.geometry.total_users() {
            warn!(
                count,
                total_users = self.geometry.total_users(),
                "stored count exceeds capacity, reinitializing"
            );
            self.init_db()?;
            return Ok(true);
        }

        Ok(false)
    }

    /// Zero every slot and write a fresh header
    pub fn init_db(&mut self) -> StoreResult<()> {
        info!(
            base_offset = self.geometry.base_offset(),
            db_size = self.geometry.db_size(),
            "initializing credential store"
        );

        let zeros = [0u8; WIPE_CHUNK];
        let mut addr = self.geometry.id_offset(0);
        let end = self.geometry.end_offset();
        while addr < end {
            let len = WIPE_CHUNK.min(end - addr);
            self.memory.write_bytes(addr, &zeros[..len])?;
            addr += len;
        }

        self.memory.write_byte(self.geometry.magic_offset(), MAGIC)?;
        self.set_count(0)?;
        self.memory.flush()
    }

    /// Whether the region has been initialized
    pub fn has_magic(&mut self) -> StoreResult<bool> {
        Ok(self.memory.read_byte(self.geometry.magic_offset())? == MAGIC)
    }

    /// Number of live records
    pub fn count(&mut self) -> StoreResult<u8> {
        self.memory.read_byte(self.geometry.count_offset())
    }

    /// Maximum number of records
    pub fn total_users(&self) -> u8 {
        self.geometry.total_users()
    }

    /// Width of each name buffer
    pub fn max_name_length(&self) -> u8 {
        self.geometry.max_name_length()
    }

    /// Bytes consumed by the region
    pub fn db_size(&self) -> usize {
        self.geometry.db_size()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    /// Release the backing memory
    pub fn into_inner(self) -> M {
        self.memory
    }

    // Field primitives. None of these flush.

    /// Live count, never beyond capacity
    fn live_count(&mut self) -> StoreResult<u8> {
        Ok(self.count()?.min(self.geometry.total_users()))
    }

    fn set_count(&mut self, count: u8) -> StoreResult<()> {
        self.memory.write_byte(self.geometry.count_offset(), count)
    }

    fn id_at(&mut self, index: u8) -> StoreResult<u32> {
        self.memory.read_u32(self.geometry.id_offset(index as usize))
    }

    fn set_id(&mut self, index: u8, id: u32) -> StoreResult<()> {
        self.memory.write_u32(self.geometry.id_offset(index as usize), id)
    }

    fn pwd_at(&mut self, index: u8) -> StoreResult<u32> {
        self.memory.read_u32(self.geometry.pwd_offset(index as usize))
    }

    fn set_pwd(&mut self, index: u8, pwd: u32) -> StoreResult<()> {
        self.memory.write_u32(self.geometry.pwd_offset(index as usize), pwd)
    }

    fn attribute_at(&mut self, index: u8) -> StoreResult<u8> {
        self.memory.read_byte(self.geometry.attribute_offset(index as usize))
    }

    fn set_attribute(&mut self, index: u8, attribute: u8) -> StoreResult<()> {
        self.memory.write_byte(self.geometry.attribute_offset(index as usize), attribute)
    }

    fn timestamp_at(&mut self, index: u8) -> StoreResult<u32> {
        self.memory.read_u32(self.geometry.timestamp_offset(index as usize))
    }

    fn set_timestamp(&mut self, index: u8, timestamp: u32) -> StoreResult<()> {
        self.memory.write_u32(self.geometry.timestamp_offset(index as usize), timestamp)
    }

    /// Copy the name at `index` into `buf` up to and including the
    /// terminator. Returns the name length.
    fn name_at(&mut self, index: u8, buf: &mut [u8]) -> StoreResult<usize> {
        let base = self.geometry.name_offset(index as usize);
        let width = self.geometry.max_name_length() as usize;
        for i in 0..width.min(buf.len()) {
            let byte = self.memory.read_byte(base + i)?;
            buf[i] = byte;
            if byte == 0 {
                return Ok(i);
            }
        }
        Ok(width.min(buf.len()))
    }

    /// Store a name followed by a terminator. Input stops at its first
    /// NUL; an empty name leaves the stored one alone.
    fn write_name(&mut self, index: u8, name: &[u8]) -> StoreResult<()> {
        let width = self.geometry.max_name_length() as usize;
        if width == 0 {
            return Err(StatusCode::InvalidArgument.into());
        }

        let len = name.iter().position(|&b| b == 0).unwrap_or(name.len());
        if len == 0 {
            return Ok(());
        }
        if len >= width {
            return Err(StatusCode::InvalidArgument.into());
        }

        let base = self.geometry.name_offset(index as usize);
        self.memory.write_bytes(base, &name[..len])?;
        self.memory.write_byte(base + len, 0)
    }

    /// Zero the full name buffer
    fn clear_name(&mut self, index: u8) -> StoreResult<()> {
        let width = self.geometry.max_name_length() as usize;
        if width == 0 {
            return Err(StatusCode::InvalidArgument.into());
        }
        let base = self.geometry.name_offset(index as usize);
        self.memory.write_bytes(base, &vec![0u8; width])
    }

    /// Copy a name between slots, stopping after the terminator
    fn copy_name(&mut self, src: u8, dst: u8) -> StoreResult<()> {
        let src_base = self.geometry.name_offset(src as usize);
        let dst_base = self.geometry.name_offset(dst as usize);
        for i in 0..self.geometry.max_name_length() as usize {
            let byte = self.memory.read_byte(src_base + i)?;
            self.memory.write_byte(dst_base + i, byte)?;
            if byte == 0 {
                break;
            }
        }
        Ok(())
    }
}

impl<M> std::fmt::Debug for RecordStore<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("geometry", &self.geometry)
            .finish()
    }
}
