use std::collections::btree_map::{self, BTreeMap};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::diag::note;
use crate::error::{Error, Result};
use crate::fs::FileSystem;
use crate::id_table::{to_indented_json, Id, EMPTY_FILE};

/// Where a log statement lives in the instrumented sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationInfo {
    #[serde(rename = "File")]
    pub file: String,
    #[serde(rename = "Line")]
    pub line: u32,
}

impl LocationInfo {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

/// Supplementary `Id → LocationInfo` list.
///
/// Location data only annotates decoded output. Unlike [`IdTable`](crate::IdTable),
/// a missing backing file is therefore not an error: it loads as an empty
/// table so the ID pipeline never blocks on it. A file that exists but does
/// not parse is still rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationTable {
    entries: BTreeMap<Id, LocationInfo>,
}

impl LocationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Ok(Self::new());
        }
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Reads the location file at `path`; an unreadable file yields an empty
    /// table and a note on `w`.
    pub fn load_from_file(fs: &dyn FileSystem, path: &Path, w: &mut dyn Write) -> Result<Self> {
        if path == Path::new(EMPTY_FILE) {
            return Ok(Self::new());
        }
        let bytes = match fs.read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "location file not readable, continuing without it");
                note(w, format_args!("File {} not found, not showing location information.", path.display()));
                return Ok(Self::new());
            }
        };
        let table = Self::load(&bytes).map_err(|e| match e {
            Error::Json(source) => Error::InvalidListFile {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        info!(path = %path.display(), items = table.len(), "loaded location list");
        note(
            w,
            format_args!(
                "Read ID location information file {} with {} items.",
                path.display(),
                table.len()
            ),
        );
        Ok(table)
    }

    pub fn save(&self) -> Result<Vec<u8>> {
        to_indented_json(&self.entries)
    }

    pub fn save_to_file(&self, fs: &dyn FileSystem, path: &Path) -> Result<()> {
        let bytes = self.save()?;
        fs.write(path, &bytes).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn get(&self, id: Id) -> Option<&LocationInfo> {
        self.entries.get(&id)
    }

    pub fn insert(&mut self, id: Id, location: LocationInfo) -> Option<LocationInfo> {
        self.entries.insert(id, location)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Id, LocationInfo> {
        self.entries.iter()
    }
}
