//! Positional access: reads by slot index and writes by position
//!
//! Positions normally come from a prior lookup. Reads are bounded by the
//! live count, not the capacity.

use tracing::debug;

use crate::error::{StatusCode, StoreResult};
use crate::storage::memory::PersistentMemory;
use crate::storage::record::{Position, Record};

use super::RecordStore;

impl<M: PersistentMemory> RecordStore<M> {
    /// Overwrite the identifier or password field addressed by `pos`.
    ///
    /// No existence or duplicate check is made; only positions outside
    /// the region are refused.
    pub fn modify_id_pwd(&mut self, pos: Position, value: u32) -> StoreResult<()> {
        if pos.index() >= self.geometry.total_users() {
            return Err(StatusCode::InvalidArgument.into());
        }
        match pos {
            Position::Id(index) => self.set_id(index, value)?,
            Position::Pwd(index) => self.set_pwd(index, value)?,
        }
        self.memory.flush()
    }

    /// Rename the live record at `pos`
    pub fn modify_name(&mut self, pos: Position, name: impl AsRef<[u8]>) -> StoreResult<()> {
        let index = self.check_live(pos.index())?;
        self.write_name(index, name.as_ref())?;
        debug!(index, "renamed record");
        self.memory.flush()
    }

    pub fn read_id(&mut self, index: u8) -> StoreResult<u32> {
        let index = self.check_live(index)?;
        self.id_at(index)
    }

    pub fn read_pwd(&mut self, index: u8) -> StoreResult<u32> {
        let index = self.check_live(index)?;
        self.pwd_at(index)
    }

    pub fn read_attribute(&mut self, index: u8) -> StoreResult<u8> {
        let index = self.check_live(index)?;
        self.attribute_at(index)
    }

    pub fn read_timestamp(&mut self, index: u8) -> StoreResult<u32> {
        let index = self.check_live(index)?;
        self.timestamp_at(index)
    }

    /// Copy the name at `index` into `buf`, stopping after the terminator.
    /// `buf` must hold at least `max_name_length` bytes. Returns the name
    /// length without the terminator.
    pub fn read_name(&mut self, index: u8, buf: &mut [u8]) -> StoreResult<usize> {
        let width = self.geometry.max_name_length() as usize;
        if width == 0 || buf.len() < width {
            return Err(StatusCode::InvalidArgument.into());
        }
        let index = self.check_live(index)?;
        self.name_at(index, buf)
    }

    /// Snapshot of the live record at `index`
    pub fn read_record(&mut self, index: u8) -> StoreResult<Record> {
        let index = self.check_live(index)?;

        let mut name = vec![0u8; self.geometry.max_name_length() as usize];
        let len = self.name_at(index, &mut name)?;
        name.truncate(len);

        Ok(Record {
            index,
            id: self.id_at(index)?,
            pwd: self.pwd_at(index)?,
            name,
            attribute: self.attribute_at(index)?,
            timestamp: self.timestamp_at(index)?,
        })
    }

    /// Snapshots of all live records in slot order
    pub fn records(&mut self) -> StoreResult<Vec<Record>> {
        let count = self.live_count()?;
        (0..count).map(|index| self.read_record(index)).collect()
    }

    fn check_live(&mut self, index: u8) -> StoreResult<u8> {
        if index < self.live_count()? {
            Ok(index)
        } else {
            Err(StatusCode::InvalidArgument.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::StatusCode;
    use crate::operations::tests::store;
    use crate::storage::record::Position;

    #[test]
    fn test_read_back_inserted_identifier() {
        let mut store = store(4, 0);
        store.insert_id(7).unwrap();

        let pos = store.position_of(7).unwrap().unwrap();
        assert_eq!(store.read_id(pos.index()).unwrap(), 7);
    }

    #[test]
    fn test_reads_bounded_by_count() {
        let mut store = store(4, 8);
        store.insert_id(1).unwrap();

        assert!(store.read_id(0).is_ok());
        for result in [
            store.read_id(1).map(|_| ()),
            store.read_pwd(1).map(|_| ()),
            store.read_attribute(3).map(|_| ()),
            store.read_timestamp(200).map(|_| ()),
            store.read_record(1).map(|_| ()),
        ] {
            assert_eq!(result.unwrap_err().status_code(), StatusCode::InvalidArgument);
        }
    }

    #[test]
    fn test_read_name() {
        let mut store = store(4, 8);
        store.insert_id(1).unwrap();
        store.insert_id_name(1, "gate").unwrap();

        let mut buf = [0xAAu8; 8];
        assert_eq!(store.read_name(0, &mut buf).unwrap(), 4);
        assert_eq!(&buf[..5], b"gate\0");
        assert_eq!(buf[5], 0xAA);

        let mut short = [0u8; 4];
        assert_eq!(
            store.read_name(0, &mut short).unwrap_err().status_code(),
            StatusCode::InvalidArgument
        );
        assert!(store.read_name(1, &mut buf).is_err());
    }

    #[test]
    fn test_read_name_disabled() {
        let mut store = store(4, 0);
        store.insert_id(1).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(
            store.read_name(0, &mut buf).unwrap_err().status_code(),
            StatusCode::InvalidArgument
        );
    }

    #[test]
    fn test_modify_id_pwd_by_position() {
        let mut store = store(4, 0);
        store.insert(1, 2).unwrap();

        let pos = store.position_of(2).unwrap().unwrap();
        store.modify_id_pwd(pos, 3).unwrap();
        assert_eq!(store.read_pwd(0).unwrap(), 3);

        store.modify_id_pwd(Position::Id(0), 11).unwrap();
        assert_eq!(store.position_of(11).unwrap(), Some(Position::Id(0)));
        assert_eq!(store.position_of(1).unwrap(), None);

        assert_eq!(
            store.modify_id_pwd(Position::Id(4), 1).unwrap_err().status_code(),
            StatusCode::InvalidArgument
        );
    }

    #[test]
    fn test_modify_id_pwd_from_legacy_tag() {
        let mut store = store(4, 0);
        store.insert(1, 2).unwrap();

        let tag = store.position_of(2).unwrap().unwrap().to_raw();
        assert_eq!(tag, 0x1000);
        store.modify_id_pwd(Position::from_raw(tag).unwrap(), 5).unwrap();
        assert_eq!(store.read_pwd(0).unwrap(), 5);
        assert_eq!(Position::from_raw(-1), None);
    }

    #[test]
    fn test_modify_name() {
        let mut store = store(4, 8);
        store.insert(1, 2).unwrap();

        store.modify_name(Position::Pwd(0), "lobby").unwrap();
        assert_eq!(store.read_record(0).unwrap().name, b"lobby");

        assert_eq!(
            store.modify_name(Position::Id(1), "x").unwrap_err().status_code(),
            StatusCode::InvalidArgument
        );
    }

    #[test]
    fn test_records_snapshot() {
        let mut store = store(4, 8);
        store.insert(1, 10).unwrap();
        store.insert_pwd(20).unwrap();
        store.insert_pwd_name(20, "kiosk").unwrap();
        store.insert_attribute(20, 2).unwrap();

        let records = store.records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[0].pwd, 10);
        assert_eq!(records[1].index, 1);
        assert_eq!(records[1].id, 0);
        assert_eq!(records[1].name_str(), Some("kiosk"));
        assert_eq!(records[1].attribute, 2);
    }
}
