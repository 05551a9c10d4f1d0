use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::fs::FileSystem;
use crate::id_allocator::SearchMethod;
use crate::id_table::Id;

/// Lowest ID handed out when nothing else is configured.
pub const DEFAULT_MIN_ID: u32 = 1000;
/// Highest ID handed out when nothing else is configured.
pub const DEFAULT_MAX_ID: u32 = 7999;

/// Allocation settings: the inclusive ID interval and the search method.
///
/// Deserializes from a JSON object where every field is optional:
///
/// ```
/// # use logid::{IdConfig, SearchMethod};
/// let cfg = IdConfig::from_json(br#"{"max": 2000, "method": "upward"}"#).unwrap();
/// assert_eq!(cfg.min, 1000);
/// assert_eq!(cfg.max, 2000);
/// assert_eq!(cfg.method, SearchMethod::Upward);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdConfig {
    pub min: u32,
    pub max: u32,
    pub method: SearchMethod,
}

impl Default for IdConfig {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_ID,
            max: DEFAULT_MAX_ID,
            method: SearchMethod::Random,
        }
    }
}

impl IdConfig {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let cfg: Self = serde_json::from_slice(bytes)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from_file(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let bytes = fs.read(path).map_err(|source| Error::ConfigUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&bytes).map_err(|e| match e {
            Error::Json(source) => Error::InvalidConfig {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.max < self.min {
            return Err(Error::InvalidRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    pub fn min_id(&self) -> Id {
        Id(self.min)
    }

    pub fn max_id(&self) -> Id {
        Id(self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemFileSystem;

    #[test]
    fn test_defaults() {
        let cfg = IdConfig::from_json(b"{}").unwrap();
        assert_eq!(cfg, IdConfig::default());
        assert_eq!(cfg.method, SearchMethod::Random);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = IdConfig::from_json(br#"{"min": 10, "max": 9}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidRange { min: 10, max: 9 }));
    }

    #[test]
    fn test_unknown_field_and_method_rejected() {
        assert!(IdConfig::from_json(br#"{"minimum": 1}"#).is_err());
        assert!(IdConfig::from_json(br#"{"method": "sideways"}"#).is_err());
    }

    #[test]
    fn test_missing_config_file_reports_config_error() {
        let fs = MemFileSystem::new();
        let err = IdConfig::load_from_file(&fs, Path::new("logid.json")).unwrap_err();
        assert!(matches!(err, Error::ConfigUnreadable { .. }));
        assert!(!err.to_string().contains("ID list"));
    }

    #[test]
    fn test_malformed_config_file_reports_config_error() {
        let fs = MemFileSystem::new().with_file("logid.json", b"[1]".to_vec());
        let err = IdConfig::load_from_file(&fs, Path::new("logid.json")).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }
}
