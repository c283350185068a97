//! Byte-addressable persistent memory
//!
//! The store only needs random byte access plus an explicit flush. On
//! parts with true EEPROM the flush does nothing; on parts that emulate
//! EEPROM in flash, writes sit in a RAM cache until flushed.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{StatusCode, StoreResult};

/// Capability the record store is built on
pub trait PersistentMemory {
    /// Number of addressable bytes
    fn capacity(&self) -> usize;

    /// Read one byte
    fn read_byte(&mut self, addr: usize) -> StoreResult<u8>;

    /// Write one byte
    fn write_byte(&mut self, addr: usize, value: u8) -> StoreResult<()>;

    /// Make pending writes durable
    fn flush(&mut self) -> StoreResult<()>;

    /// Read `buf.len()` bytes starting at `addr`
    fn read_bytes(&mut self, addr: usize, buf: &mut [u8]) -> StoreResult<()> {
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = self.read_byte(addr + i)?;
        }
        Ok(())
    }

    /// Write `data` starting at `addr`
    fn write_bytes(&mut self, addr: usize, data: &[u8]) -> StoreResult<()> {
        for (i, byte) in data.iter().enumerate() {
            self.write_byte(addr + i, *byte)?;
        }
        Ok(())
    }

    /// Read a little-endian u32
    fn read_u32(&mut self, addr: usize) -> StoreResult<u32> {
        let mut buf = [0u8; 4];
        self.read_bytes(addr, &mut buf)?;
        Ok(LittleEndian::read_u32(&buf))
    }

    /// Write a little-endian u32
    fn write_u32(&mut self, addr: usize, value: u32) -> StoreResult<()> {
        let mut buf = [0u8; 4];
        LittleEndian::write_u32(&mut buf, value);
        self.write_bytes(addr, &buf)
    }
}

/// How writes reach the durable image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Every write is durable immediately; flush is a no-op
    WriteThrough,
    /// Writes stay in a volatile cache until flush
    Cached,
}

/// Flush statistics
#[derive(Debug, Default, Clone)]
pub struct MemoryStats {
    pub byte_reads: u64,
    pub byte_writes: u64,
    pub flushes: u64,
}

/// In-RAM persistent memory image
pub struct MemoryStore {
    durable: Vec<u8>,
    cache: Vec<u8>,
    mode: WriteMode,
    dirty: bool,
    stats: MemoryStats,
}

impl MemoryStore {
    /// Create an erased (0xFF filled) write-through image
    pub fn new(size: usize) -> Self {
        Self::with_mode(size, WriteMode::WriteThrough)
    }

    /// Create an erased image with the given write mode
    pub fn with_mode(size: usize, mode: WriteMode) -> Self {
        Self::from_image(vec![0xFF; size], mode)
    }

    /// Wrap an existing image
    pub fn from_image(image: Vec<u8>, mode: WriteMode) -> Self {
        MemoryStore {
            cache: image.clone(),
            durable: image,
            mode,
            dirty: false,
            stats: MemoryStats::default(),
        }
    }

    /// Write mode of this image
    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    /// Contents that would survive a power cycle
    pub fn durable(&self) -> &[u8] {
        &self.durable
    }

    /// Whether there are writes not yet flushed
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Drop unflushed writes, as losing power would
    pub fn power_cycle(&mut self) {
        self.cache.copy_from_slice(&self.durable);
        self.dirty = false;
    }

    /// Access statistics
    pub fn stats(&self) -> MemoryStats {
        self.stats.clone()
    }

    fn check(&self, addr: usize, len: usize) -> StoreResult<()> {
        match addr.checked_add(len) {
            Some(end) if end <= self.cache.len() => Ok(()),
            _ => Err(StatusCode::AddressOutOfRange.into()),
        }
    }
}

impl PersistentMemory for MemoryStore {
    fn capacity(&self) -> usize {
        self.cache.len()
    }

    fn read_byte(&mut self, addr: usize) -> StoreResult<u8> {
        self.check(addr, 1)?;
        self.stats.byte_reads += 1;
        Ok(self.cache[addr])
    }

    fn write_byte(&mut self, addr: usize, value: u8) -> StoreResult<()> {
        self.write_bytes(addr, &[value])
    }

    fn read_bytes(&mut self, addr: usize, buf: &mut [u8]) -> StoreResult<()> {
        self.check(addr, buf.len())?;
        self.stats.byte_reads += buf.len() as u64;
        buf.copy_from_slice(&self.cache[addr..addr + buf.len()]);
        Ok(())
    }

    fn write_bytes(&mut self, addr: usize, data: &[u8]) -> StoreResult<()> {
        self.check(addr, data.len())?;
        self.stats.byte_writes += data.len() as u64;
        self.cache[addr..addr + data.len()].copy_from_slice(data);
        match self.mode {
            WriteMode::WriteThrough => {
                self.durable[addr..addr + data.len()].copy_from_slice(data);
            }
            WriteMode::Cached => self.dirty = true,
        }
        Ok(())
    }

    fn flush(&mut self) -> StoreResult<()> {
        self.stats.flushes += 1;
        if self.dirty {
            self.durable.copy_from_slice(&self.cache);
            self.dirty = false;
        }
        Ok(())
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("size", &self.cache.len())
            .field("mode", &self.mode)
            .field("dirty", &self.dirty)
            .finish()
    }
}
