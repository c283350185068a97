//! Persistent memory image kept in a file
//!
//! Useful for host-side tooling and for exercising the store across a
//! close/reopen cycle. Writes go straight to the file; `flush` syncs.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{StatusCode, StoreResult};

use super::memory::PersistentMemory;

/// A fixed-size memory image backed by a file
pub struct FileStore {
    path: PathBuf,
    file: File,
    size: usize,
}

impl FileStore {
    /// Create (or truncate) an image of `size` erased bytes
    pub fn create(path: &Path, size: usize) -> StoreResult<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        file.write_all(&vec![0xFF; size])?;
        file.sync_all()?;

        Ok(FileStore {
            path: path.to_path_buf(),
            file,
            size,
        })
    }

    /// Open an existing image; its size is the file length
    pub fn open(path: &Path) -> StoreResult<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let size = file.metadata()?.len() as usize;

        Ok(FileStore {
            path: path.to_path_buf(),
            file,
            size,
        })
    }

    /// Path of the image file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn seek_checked(&mut self, addr: usize, len: usize) -> StoreResult<()> {
        match addr.checked_add(len) {
            Some(end) if end <= self.size => {
                self.file.seek(SeekFrom::Start(addr as u64))?;
                Ok(())
            }
            _ => Err(StatusCode::AddressOutOfRange.into()),
        }
    }
}

impl PersistentMemory for FileStore {
    fn capacity(&self) -> usize {
        self.size
    }

    fn read_byte(&mut self, addr: usize) -> StoreResult<u8> {
        let mut buf = [0u8; 1];
        self.read_bytes(addr, &mut buf)?;
        Ok(buf[0])
    }

    fn write_byte(&mut self, addr: usize, value: u8) -> StoreResult<()> {
        self.write_bytes(addr, &[value])
    }

    fn read_bytes(&mut self, addr: usize, buf: &mut [u8]) -> StoreResult<()> {
        self.seek_checked(addr, buf.len())?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    fn write_bytes(&mut self, addr: usize, data: &[u8]) -> StoreResult<()> {
        self.seek_checked(addr, data.len())?;
        self.file.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> StoreResult<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("path", &self.path)
            .field("size", &self.size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_and_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eeprom.bin");

        {
            let mut store = FileStore::create(&path, 64).unwrap();
            assert_eq!(store.path(), path.as_path());
            assert_eq!(store.capacity(), 64);
            assert_eq!(store.read_byte(10).unwrap(), 0xFF);
            store.write_u32(10, 0xDEAD_BEEF).unwrap();
            store.flush().unwrap();
        }

        let mut store = FileStore::open(&path).unwrap();
        assert_eq!(store.capacity(), 64);
        assert_eq!(store.read_u32(10).unwrap(), 0xDEAD_BEEF);
    }

    #[test]
    fn test_bounds() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::create(&dir.path().join("small.bin"), 4).unwrap();

        assert!(store.write_u32(0, 1).is_ok());
        assert!(store.write_u32(1, 1).is_err());
        assert!(store.read_byte(4).is_err());
    }
}
