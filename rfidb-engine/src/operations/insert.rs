//! Insert operations: upsert by identifier/password and per-field writes

use tracing::debug;

use crate::error::{StatusCode, StoreResult};
use crate::storage::memory::PersistentMemory;
use crate::storage::record::Position;

use super::RecordStore;

impl<M: PersistentMemory> RecordStore<M> {
    /// Upsert a credential. Zero means "absent" for either key.
    ///
    /// - An existing identifier gets `pwd` attached to its slot.
    /// - Otherwise an existing password gets `id` attached to its slot.
    /// - Otherwise a new record is appended at slot `count`.
    ///
    /// Returns where the record lives, tagged by the key that located
    /// (or, for new records, the first non-zero key of) it.
    pub fn insert(&mut self, id: u32, pwd: u32) -> StoreResult<Position> {
        if id == 0 && pwd == 0 {
            return Err(StatusCode::InvalidArgument.into());
        }

        if id != 0 {
            if let Some(Position::Id(index)) = self.position_of(id)? {
                if pwd != 0 {
                    debug!(id, index, "attaching password to identifier");
                    self.set_pwd(index, pwd)?;
                }
                self.memory.flush()?;
                return Ok(Position::Id(index));
            }
        }

        if pwd != 0 {
            if let Some(Position::Pwd(index)) = self.position_of(pwd)? {
                if id != 0 {
                    debug!(id, index, "attaching identifier to password");
                    self.set_id(index, id)?;
                }
                self.memory.flush()?;
                return Ok(Position::Pwd(index));
            }
        }

        let count = self.live_count()?;
        if count >= self.geometry.total_users() {
            return Err(StatusCode::CapacityExceeded.into());
        }

        if id != 0 {
            self.set_id(count, id)?;
        }
        if pwd != 0 {
            self.set_pwd(count, pwd)?;
        }
        self.set_count(count + 1)?;
        self.memory.flush()?;

        debug!(index = count, has_id = id != 0, has_pwd = pwd != 0, "new record");
        Ok(if id != 0 { Position::Id(count) } else { Position::Pwd(count) })
    }

    /// Insert a bare identifier
    pub fn insert_id(&mut self, id: u32) -> StoreResult<Position> {
        self.insert(id, 0)
    }

    /// Insert an identifier, attaching `pwd` when the identifier or the
    /// password is already on file
    pub fn insert_id_with_pwd(&mut self, id: u32, pwd: u32) -> StoreResult<Position> {
        if id == 0 {
            return Err(StatusCode::InvalidArgument.into());
        }
        self.insert(id, pwd)
    }

    /// Insert a bare password
    pub fn insert_pwd(&mut self, pwd: u32) -> StoreResult<Position> {
        self.insert(0, pwd)
    }

    /// Insert a password, attaching `id` when the password or the
    /// identifier is already on file
    pub fn insert_pwd_with_id(&mut self, pwd: u32, id: u32) -> StoreResult<Position> {
        if pwd == 0 {
            return Err(StatusCode::InvalidArgument.into());
        }
        self.insert(id, pwd)
    }

    /// Name the record that holds identifier `id`
    pub fn insert_id_name(&mut self, id: u32, name: impl AsRef<[u8]>) -> StoreResult<()> {
        let index = self.expect_id(id)?;
        self.write_name(index, name.as_ref())?;
        debug!(id, index, "named record");
        self.memory.flush()
    }

    /// Name the record that holds password `pwd`
    pub fn insert_pwd_name(&mut self, pwd: u32, name: impl AsRef<[u8]>) -> StoreResult<()> {
        let index = self.expect_pwd(pwd)?;
        self.write_name(index, name.as_ref())?;
        debug!(index, "named record");
        self.memory.flush()
    }

    /// Set the permission byte of the record holding `key` as either
    /// identifier or password
    pub fn insert_attribute(&mut self, key: u32, attribute: u8) -> StoreResult<()> {
        let index = self.expect_any(key)?;
        self.set_attribute(index, attribute)?;
        self.memory.flush()
    }

    /// Set the timestamp of the record holding `key` as either
    /// identifier or password
    pub fn insert_timestamp(&mut self, key: u32, timestamp: u32) -> StoreResult<()> {
        let index = self.expect_any(key)?;
        self.set_timestamp(index, timestamp)?;
        self.memory.flush()
    }

    /// Slot index of identifier `id`, which must be on file as an identifier
    pub(super) fn expect_id(&mut self, id: u32) -> StoreResult<u8> {
        match self.lookup_key(id)? {
            Position::Id(index) => Ok(index),
            Position::Pwd(_) => Err(StatusCode::TypeMismatch.into()),
        }
    }

    /// Slot index of password `pwd`, which must be on file as a password
    pub(super) fn expect_pwd(&mut self, pwd: u32) -> StoreResult<u8> {
        match self.lookup_key(pwd)? {
            Position::Pwd(index) => Ok(index),
            Position::Id(_) => Err(StatusCode::TypeMismatch.into()),
        }
    }

    fn expect_any(&mut self, key: u32) -> StoreResult<u8> {
        Ok(self.lookup_key(key)?.index())
    }

    /// Non-zero key lookup that turns a miss into `NotFound`
    fn lookup_key(&mut self, key: u32) -> StoreResult<Position> {
        if key == 0 {
            return Err(StatusCode::InvalidArgument.into());
        }
        self.position_of(key)?
            .ok_or_else(|| StatusCode::NotFound.into())
    }
}
