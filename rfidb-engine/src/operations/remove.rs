//! Remove operations: detach a key, delete a record, clear a name
//!
//! A record keeps its slot while it still has either key. Removing the
//! last key deletes the record: the last live record is moved into the
//! freed slot and the old last slot is zeroed, so live slots stay packed
//! in `[0, count)`. Slot order is therefore not insertion order once a
//! compaction has happened.

use tracing::debug;

use crate::error::{StatusCode, StoreResult};
use crate::storage::memory::PersistentMemory;

use super::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyKind {
    Id,
    Pwd,
}

impl<M: PersistentMemory> RecordStore<M> {
    /// Remove an identifier and/or a password. Zero means "absent".
    /// Both keys are resolved to slots before anything is changed.
    pub fn remove(&mut self, id: u32, pwd: u32) -> StoreResult<()> {
        if id == 0 && pwd == 0 {
            return Err(StatusCode::InvalidArgument.into());
        }
        if self.live_count()? == 0 {
            return Err(StatusCode::NotFound.into());
        }

        let id_index = if id != 0 { Some(self.expect_id(id)?) } else { None };
        let pwd_index = if pwd != 0 { Some(self.expect_pwd(pwd)?) } else { None };

        let result = self.remove_resolved(id_index, pwd_index);
        let flushed = self.memory.flush();
        result.and(flushed)
    }

    /// Remove an identifier; deletes the record if it has no password
    pub fn remove_id(&mut self, id: u32) -> StoreResult<()> {
        self.remove(id, 0)
    }

    /// Remove a password; deletes the record if it has no identifier
    pub fn remove_pwd(&mut self, pwd: u32) -> StoreResult<()> {
        self.remove(0, pwd)
    }

    /// Zero the name of the record holding identifier `id`
    pub fn remove_id_name(&mut self, id: u32) -> StoreResult<()> {
        let index = self.expect_id(id)?;
        self.clear_name(index)?;
        debug!(id, index, "cleared name");
        self.memory.flush()
    }

    /// Zero the name of the record holding password `pwd`
    pub fn remove_pwd_name(&mut self, pwd: u32) -> StoreResult<()> {
        let index = self.expect_pwd(pwd)?;
        self.clear_name(index)?;
        debug!(index, "cleared name");
        self.memory.flush()
    }

    fn remove_resolved(&mut self, id_index: Option<u8>, pwd_index: Option<u8>) -> StoreResult<()> {
        match (id_index, pwd_index) {
            (Some(i), Some(p)) if i == p => {
                // Both keys of one record: nothing is left to keep
                let count = self.live_count()?;
                self.move_last(count, i)
            }
            (Some(i), Some(p)) => {
                // Compaction only moves the last slot, so handling the
                // higher slot first leaves the lower one in place
                if i > p {
                    self.remove_at(i, KeyKind::Id)?;
                    self.remove_at(p, KeyKind::Pwd)
                } else {
                    self.remove_at(p, KeyKind::Pwd)?;
                    self.remove_at(i, KeyKind::Id)
                }
            }
            (Some(i), None) => self.remove_at(i, KeyKind::Id),
            (None, Some(p)) => self.remove_at(p, KeyKind::Pwd),
            (None, None) => Err(StatusCode::InvalidArgument.into()),
        }
    }

    /// Detach one key from slot `index`, deleting the record if it was
    /// the only key left
    fn remove_at(&mut self, index: u8, kind: KeyKind) -> StoreResult<()> {
        let other = match kind {
            KeyKind::Id => self.pwd_at(index)?,
            KeyKind::Pwd => self.id_at(index)?,
        };

        if other != 0 {
            debug!(?kind, index, "detaching key");
            match kind {
                KeyKind::Id => self.set_id(index, 0),
                KeyKind::Pwd => self.set_pwd(index, 0),
            }
        } else {
            let count = self.live_count()?;
            self.move_last(count, index)
        }
    }

    /// Fill slot `index` with the last live record and retire the last slot
    fn move_last(&mut self, count: u8, index: u8) -> StoreResult<()> {
        let last = count - 1;

        if index != last {
            let id = self.id_at(last)?;
            let pwd = self.pwd_at(last)?;
            let attribute = self.attribute_at(last)?;
            let timestamp = self.timestamp_at(last)?;

            self.set_id(index, id)?;
            self.set_pwd(index, pwd)?;
            self.set_attribute(index, attribute)?;
            self.set_timestamp(index, timestamp)?;
            if self.geometry.max_name_length() > 0 {
                self.copy_name(last, index)?;
            }
        }

        self.set_id(last, 0)?;
        self.set_pwd(last, 0)?;
        self.set_attribute(last, 0)?;
        self.set_timestamp(last, 0)?;
        if self.geometry.max_name_length() > 0 {
            self.clear_name(last)?;
        }

        self.set_count(last)?;
        debug!(freed = index, moved_from = last, count = last, "compacted");
        Ok(())
    }
}
