//! Slot positions and record snapshots

/// Legacy tag bit marking a password position
pub const PWDFLAG: i16 = 0x1000;

/// Mask recovering the slot index from a legacy password tag
pub const PWDMASK: i16 = 0x0FFF;

/// Where a lookup matched: the identifier or the password field of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    /// Identifier field of the slot
    Id(u8),
    /// Password field of the slot
    Pwd(u8),
}

impl Position {
    /// Slot index regardless of which field matched
    pub fn index(&self) -> u8 {
        match *self {
            Position::Id(index) | Position::Pwd(index) => index,
        }
    }

    pub fn is_id(&self) -> bool {
        matches!(self, Position::Id(_))
    }

    pub fn is_pwd(&self) -> bool {
        matches!(self, Position::Pwd(_))
    }

    /// Encode as a legacy 16-bit tag (password positions carry `PWDFLAG`)
    pub fn to_raw(&self) -> i16 {
        match *self {
            Position::Id(index) => index as i16,
            Position::Pwd(index) => PWDFLAG | index as i16,
        }
    }

    /// Decode a legacy 16-bit tag; negative tags and indexes beyond the
    /// one-byte slot range decode to `None`
    pub fn from_raw(tag: i16) -> Option<Self> {
        if tag < 0 {
            return None;
        }
        let index = u8::try_from(tag & PWDMASK).ok()?;
        if tag >= PWDFLAG {
            Some(Position::Pwd(index))
        } else {
            Some(Position::Id(index))
        }
    }
}

/// Copy of one live slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// Slot index
    pub index: u8,
    /// Identifier, 0 when detached
    pub id: u32,
    /// Password, 0 when detached
    pub pwd: u32,
    /// Name bytes up to (not including) the terminator
    pub name: Vec<u8>,
    /// Permission byte
    pub attribute: u8,
    /// Timestamp
    pub timestamp: u32,
}

impl Record {
    /// Name as text, if it is valid UTF-8
    pub fn name_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.name).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_tags() {
        assert_eq!(Position::Id(5).to_raw(), 5);
        assert_eq!(Position::Pwd(5).to_raw(), 0x1005);

        assert_eq!(Position::from_raw(5), Some(Position::Id(5)));
        assert_eq!(Position::from_raw(0x1005), Some(Position::Pwd(5)));
        assert_eq!(Position::from_raw(-1), None);
        assert_eq!(Position::from_raw(0x0100), None);
    }

    #[test]
    fn test_position_kind() {
        let pos = Position::Pwd(3);
        assert!(pos.is_pwd());
        assert!(!pos.is_id());
        assert_eq!(pos.index(), 3);
    }
}
