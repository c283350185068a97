//! Store configuration
//!
//! Geometry is fixed for the lifetime of a region, so it is usually
//! provisioned once from a small TOML file:
//!
//! ```toml
//! base_offset = 0
//! max_name_length = 16
//! total_users = 40      # or: storage_size = 1024
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::storage::Geometry;

/// Construction-time settings for a record store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Start of the region in persistent memory
    pub base_offset: usize,
    /// Width of each name buffer (0 disables names)
    pub max_name_length: u8,
    /// Explicit record capacity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_users: Option<u8>,
    /// Size of persistent memory to derive the capacity from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_size: Option<usize>,
}

impl StoreConfig {
    /// Parse from TOML text
    pub fn from_toml_str(text: &str) -> StoreResult<Self> {
        toml::from_str(text).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> StoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Render as TOML text
    pub fn to_toml_string(&self) -> StoreResult<String> {
        toml::to_string(self).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Resolve into a geometry; exactly one capacity source must be set
    pub fn to_geometry(&self) -> StoreResult<Geometry> {
        match (self.total_users, self.storage_size) {
            (Some(total_users), None) => Ok(Geometry::new(
                total_users,
                self.base_offset,
                self.max_name_length,
            )),
            (None, Some(storage_size)) => {
                Geometry::from_storage_size(storage_size, self.base_offset, self.max_name_length)
            }
            (Some(_), Some(_)) => Err(StoreError::Config(
                "total_users and storage_size are mutually exclusive".to_string(),
            )),
            (None, None) => Err(StoreError::Config(
                "one of total_users or storage_size is required".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_users_config() {
        let config = StoreConfig::from_toml_str(
            "base_offset = 16\nmax_name_length = 12\ntotal_users = 30\n",
        )
        .unwrap();

        let geometry = config.to_geometry().unwrap();
        assert_eq!(geometry.total_users(), 30);
        assert_eq!(geometry.base_offset(), 16);
        assert_eq!(geometry.max_name_length(), 12);
        assert_eq!(geometry.storage_size(), None);
    }

    #[test]
    fn test_storage_size_config() {
        let config = StoreConfig::from_toml_str("storage_size = 512\n").unwrap();
        let geometry = config.to_geometry().unwrap();

        assert_eq!(geometry.total_users(), 39);
        assert_eq!(geometry.max_name_length(), 0);
    }

    #[test]
    fn test_capacity_sources_are_exclusive() {
        let both = StoreConfig::from_toml_str("total_users = 4\nstorage_size = 512\n").unwrap();
        assert!(matches!(both.to_geometry(), Err(StoreError::Config(_))));

        let neither = StoreConfig::from_toml_str("max_name_length = 8\n").unwrap();
        assert!(matches!(neither.to_geometry(), Err(StoreError::Config(_))));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let err = StoreConfig::from_toml_str("max_users = 4\n").unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = StoreConfig {
            base_offset: 8,
            max_name_length: 10,
            total_users: Some(12),
            storage_size: None,
        };

        let text = config.to_toml_string().unwrap();
        assert_eq!(StoreConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.toml");
        std::fs::write(&path, "total_users = 5\n").unwrap();

        let config = StoreConfig::load(&path).unwrap();
        assert_eq!(config.total_users, Some(5));
    }
}
