//! # logid
//!
//! ID list management for ID-based binary logging.
//!
//! Instrumented code emits a small numeric ID instead of its format string;
//! a decoder later turns the IDs back into text using the ID list. This crate
//! maintains that list:
//!
//! * **Allocation**: picks an unused ID inside a configured interval, by
//!   random draw, smallest free or largest free
//! * **Persistence**: loads and saves the list as human-reviewable JSON
//! * **Deduplication**: finds IDs already bound to an identical format string
//! * **Normalization**: adds the format-specifier count to type tags
//!
//! ## Main Components
//!
//! * `IdTable`: `Id → FormatDescriptor`, the primary list
//! * `LocationTable`: `Id → LocationInfo`, optional source locations
//! * `id_allocator`: the search strategies and the reuse-or-allocate policy
//! * `ReverseIndex`: `FormatDescriptor → [Id]`
//! * `reconcile`: specifier-count normalization
//!
//! All file access goes through a [`FileSystem`](fs::FileSystem); conditions
//! that would compromise the ID space come back as [`Error`]s whose
//! [`Severity`] tells the caller whether to stop.
//!
//! ## Quick Start
//!
//! ```
//! use logid::{assign_id, reconcile, FormatDescriptor, IdConfig, IdTable, SearchMethod};
//! use logid::fs::MemFileSystem;
//! use std::path::Path;
//!
//! let fs = MemFileSystem::new().with_file("til.json", Vec::new());
//! let mut diag = Vec::new();
//! let mut table = IdTable::load_from_file(&fs, Path::new("til.json"), &mut diag).unwrap();
//!
//! let config = IdConfig { min: 1, max: 100, method: SearchMethod::Upward };
//! let id = assign_id(&mut table, FormatDescriptor::new("TRICE16", "x=%d"), &config, &mut diag).unwrap();
//! assert_eq!(id.0, 1);
//!
//! reconcile(&mut table, &mut diag);
//! assert_eq!(table.get(id).unwrap().type_tag(), "TRICE16_1");
//!
//! table.save_to_file(&fs, Path::new("til.json")).unwrap();
//! ```

pub mod config;
mod diag;
pub mod error;
pub mod format_descriptor;
pub mod fs;
pub mod id_allocator;
pub mod id_table;
pub mod location_table;
pub mod reconcile;
pub mod reverse_index;

pub use config::IdConfig;
pub use error::{Error, Result, Severity};
pub use format_descriptor::FormatDescriptor;
pub use id_allocator::{allocate, allocate_by_name, allocate_with_rng, assign_id, SearchMethod};
pub use id_table::{Id, IdTable, EMPTY_FILE};
pub use location_table::{LocationInfo, LocationTable};
pub use reconcile::{count_format_specifiers, reconcile, ReconcileReport};
pub use reverse_index::{build_reverse_index, ReverseIndex};
