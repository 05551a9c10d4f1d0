//! ID list table mapping format descriptors to compact numeric IDs.
//!
//! The table is the persistent half of the system: instrumented sources carry
//! only the numeric ID, and a decoder later looks the ID up here to rebuild
//! the human-readable line. Losing or corrupting the table therefore makes
//! already-emitted logs unreadable, which is why every I/O failure on the
//! primary list is a fatal error.
//!
//! # Ordering
//!
//! Entries are kept in ascending ID order. Serialization, iteration and every
//! structure derived from the table (such as the reverse index) are
//! deterministic across runs.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::diag::note;
use crate::error::{Error, Result};
use crate::format_descriptor::FormatDescriptor;
use crate::fs::FileSystem;

/// Reserved path that stands for "no file": loading it yields an empty table
/// without touching the file system. Meant for tests.
pub const EMPTY_FILE: &str = "emptyFile";

/// A wire-level log statement identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(pub u32);

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Id {
    fn from(value: u32) -> Self {
        Id(value)
    }
}

/// In-memory ID list: `Id → FormatDescriptor`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdTable {
    entries: BTreeMap<Id, FormatDescriptor>,
}

impl IdTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an ID list document.
    ///
    /// An empty byte stream is a valid, empty list. Anything else must be a
    /// JSON object mapping decimal-string IDs to `{"Type", "Strg"}` objects.
    ///
    /// # Examples
    ///
    /// ```
    /// # use logid::{IdTable, Id};
    /// let table = IdTable::load(br#"{"12": {"Type": "TRICE16", "Strg": "x=%d"}}"#).unwrap();
    /// assert_eq!(table.get(Id(12)).unwrap().format(), "x=%d");
    ///
    /// assert!(IdTable::load(b"").unwrap().is_empty());
    /// ```
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let mut table = Self::new();
        table.extend_from_json(bytes)?;
        Ok(table)
    }

    /// Reads the ID list file at `path`.
    ///
    /// [`EMPTY_FILE`] yields an empty table without any file access. Any other
    /// path that cannot be read is an error: starting from an empty ID space
    /// when a populated list was expected would hand out IDs that are already
    /// in use.
    pub fn load_from_file(fs: &dyn FileSystem, path: &Path, w: &mut dyn Write) -> Result<Self> {
        let mut table = Self::new();
        if path == Path::new(EMPTY_FILE) {
            return Ok(table);
        }
        table.merge_from_file(fs, path)?;
        note(w, format_args!("Read ID list file {} with {} items.", path.display(), table.len()));
        Ok(table)
    }

    /// Reads another list file into this table. Existing IDs are overwritten,
    /// new IDs are added.
    pub fn merge_from_file(&mut self, fs: &dyn FileSystem, path: &Path) -> Result<()> {
        let bytes = fs.read(path).map_err(|source| Error::ListFileUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        self.extend_from_json(&bytes).map_err(|e| match e {
            Error::Json(source) => Error::InvalidListFile {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        info!(path = %path.display(), items = self.len(), "loaded ID list");
        Ok(())
    }

    fn extend_from_json(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        let parsed: BTreeMap<Id, FormatDescriptor> = serde_json::from_slice(bytes)?;
        debug!(items = parsed.len(), "parsed ID list document");
        self.entries.extend(parsed);
        Ok(())
    }

    /// Serializes the table as tab-indented JSON in ascending ID order.
    pub fn save(&self) -> Result<Vec<u8>> {
        to_indented_json(&self.entries)
    }

    /// Writes the table to `path`, replacing any previous content.
    pub fn save_to_file(&self, fs: &dyn FileSystem, path: &Path) -> Result<()> {
        let bytes = self.save()?;
        fs.write(path, &bytes).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), items = self.len(), "wrote ID list");
        Ok(())
    }

    pub fn get(&self, id: Id) -> Option<&FormatDescriptor> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.entries.contains_key(&id)
    }

    /// Binds `id` to `descriptor`, returning the descriptor it replaced.
    pub fn insert(&mut self, id: Id, descriptor: FormatDescriptor) -> Option<FormatDescriptor> {
        self.entries.insert(id, descriptor)
    }

    pub fn remove(&mut self, id: Id) -> Option<FormatDescriptor> {
        self.entries.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending ID order.
    pub fn iter(&self) -> btree_map::Iter<'_, Id, FormatDescriptor> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.entries.keys().copied()
    }
}

impl Extend<(Id, FormatDescriptor)> for IdTable {
    fn extend<I: IntoIterator<Item = (Id, FormatDescriptor)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl FromIterator<(Id, FormatDescriptor)> for IdTable {
    fn from_iter<I: IntoIterator<Item = (Id, FormatDescriptor)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a IdTable {
    type Item = (&'a Id, &'a FormatDescriptor);
    type IntoIter = btree_map::Iter<'a, Id, FormatDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Human-reviewable JSON: one tab per nesting level.
pub(crate) fn to_indented_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::test_support::BrokenWriter;
    use crate::fs::MemFileSystem;

    fn sample() -> IdTable {
        [
            (Id(10000), FormatDescriptor::new("Trice8_2", "hi %03u, %5x")),
            (Id(10001), FormatDescriptor::new("TRICE16", "hi %03u, %5x")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_save_is_tab_indented_with_string_keys() {
        let text = String::from_utf8(sample().save().unwrap()).unwrap();
        assert!(text.contains("\n\t\"10000\": {\n\t\t\"Type\": \"Trice8_2\""));
        assert!(text.find("10000").unwrap() < text.find("10001").unwrap());
    }

    #[test]
    fn test_load_rejects_wrong_shape() {
        let err = IdTable::load(br#"{"1": {"Type": 5}}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        assert!(IdTable::load(b"not json").is_err());
        assert!(IdTable::load(br#"{"abc": {"Type": "T", "Strg": ""}}"#).is_err());
    }

    #[test]
    fn test_empty_file_sentinel_skips_fs() {
        let fs = MemFileSystem::new();
        let mut diag = Vec::new();
        let table = IdTable::load_from_file(&fs, Path::new(EMPTY_FILE), &mut diag).unwrap();
        assert!(table.is_empty());
        assert!(diag.is_empty());
    }

    #[test]
    fn test_missing_list_file_is_fatal() {
        let fs = MemFileSystem::new();
        let err = IdTable::load_from_file(&fs, Path::new("til.json"), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, Error::ListFileUnreadable { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_malformed_list_file_names_path() {
        let fs = MemFileSystem::new().with_file("til.json", b"{ broken".to_vec());
        let err = IdTable::load_from_file(&fs, Path::new("til.json"), &mut Vec::new()).unwrap_err();
        match err {
            Error::InvalidListFile { path, .. } => assert_eq!(path, Path::new("til.json")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_merge_overwrites_existing_ids() {
        let fs = MemFileSystem::new().with_file(
            "more.json",
            br#"{"10001": {"Type": "TRICE32", "Strg": "new"}, "7": {"Type": "TRICE0", "Strg": "x"}}"#.to_vec(),
        );
        let mut table = sample();
        table.merge_from_file(&fs, Path::new("more.json")).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(Id(10001)).unwrap().format(), "new");
        assert_eq!(table.get(Id(10000)).unwrap().type_tag(), "Trice8_2");
    }

    #[test]
    fn test_loaded_table_survives_broken_diagnostic_writer() {
        let fs = MemFileSystem::new().with_file("til.json", sample().save().unwrap());
        let table = IdTable::load_from_file(&fs, Path::new("til.json"), &mut BrokenWriter).unwrap();
        assert_eq!(table, sample());
    }
}
