//! Content-addressed lookup
//!
//! Live slots are scanned in index order. For each slot the identifier
//! is compared first (under the caller's mask), then the password
//! (always the full 32 bits). The first hit wins.

use tracing::trace;

use crate::error::StoreResult;
use crate::storage::memory::PersistentMemory;
use crate::storage::record::Position;

use super::RecordStore;

/// Compare all 32 bits
pub const FULL_MASK: u32 = 0xFFFF_FFFF;

/// Compare the low 24 bits, for readers that only report 24-bit codes
pub const MASK_24: u32 = 0x00FF_FFFF;

impl<M: PersistentMemory> RecordStore<M> {
    /// Find the slot holding `value` as identifier or password
    pub fn position_of(&mut self, value: u32) -> StoreResult<Option<Position>> {
        self.position_of_masked(value, FULL_MASK)
    }

    /// Like `position_of`, but identifiers only need to agree on the
    /// low 24 bits
    pub fn position_of_24(&mut self, value: u32) -> StoreResult<Option<Position>> {
        self.position_of_masked(value, MASK_24)
    }

    pub fn contains(&mut self, value: u32) -> StoreResult<bool> {
        Ok(self.position_of(value)?.is_some())
    }

    pub fn contains_24(&mut self, value: u32) -> StoreResult<bool> {
        Ok(self.position_of_24(value)?.is_some())
    }

    fn position_of_masked(&mut self, value: u32, mask: u32) -> StoreResult<Option<Position>> {
        let masked = value & mask;
        let count = self.live_count()?;

        for index in 0..count {
            if self.id_at(index)? & mask == masked {
                trace!(value, index, "matched identifier");
                return Ok(Some(Position::Id(index)));
            }
            if self.pwd_at(index)? == value {
                trace!(value, index, "matched password");
                return Ok(Some(Position::Pwd(index)));
            }
        }

        trace!(value, mask, "no match");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use crate::operations::tests::store;
    use crate::storage::record::Position;

    #[test]
    fn test_empty_store_finds_nothing() {
        let mut store = store(4, 0);
        for value in [0, 1, 0xFFFF_FFFF] {
            assert_eq!(store.position_of(value).unwrap(), None);
            assert!(!store.contains_24(value).unwrap());
        }
    }

    #[test]
    fn test_identifier_and_password_tags() {
        let mut store = store(4, 0);
        store.insert_id(100).unwrap();
        store.insert_pwd(200).unwrap();

        assert_eq!(store.position_of(100).unwrap(), Some(Position::Id(0)));
        assert_eq!(store.position_of(200).unwrap(), Some(Position::Pwd(1)));
        assert!(store.contains(200).unwrap());
        assert!(!store.contains(300).unwrap());
    }

    #[test]
    fn test_masked_identifier_match() {
        let mut store = store(4, 0);
        store.insert_id(0x12AB_CDEF).unwrap();

        assert_eq!(store.position_of_24(0x34AB_CDEF).unwrap(), Some(Position::Id(0)));
        assert_eq!(store.position_of(0x34AB_CDEF).unwrap(), None);
        assert!(store.contains_24(0x00AB_CDEF).unwrap());
    }

    #[test]
    fn test_password_never_masked() {
        let mut store = store(4, 0);
        store.insert_pwd(0x12AB_CDEF).unwrap();

        assert_eq!(store.position_of_24(0x12AB_CDEF).unwrap(), Some(Position::Pwd(0)));
        assert_eq!(store.position_of_24(0x34AB_CDEF).unwrap(), None);
    }

    #[test]
    fn test_earliest_slot_wins() {
        let mut store = store(4, 0);
        store.insert_pwd(5).unwrap();
        // Identifier 5 lands in slot 1; slot 0 still matches first
        store.insert_id(5).unwrap();

        assert_eq!(store.count().unwrap(), 2);
        assert_eq!(store.position_of(5).unwrap(), Some(Position::Pwd(0)));
    }
}
