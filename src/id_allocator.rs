//! Picking unused IDs from a bounded interval.
//!
//! The allocator only looks at the table it is given. That table must already
//! contain every ID in use anywhere in the project, including IDs that have
//! not been written back to disk yet; otherwise an ID used elsewhere can be
//! handed out again. This precondition cannot be checked here.
//!
//! A returned ID is not reserved. Calling [`allocate`] twice on an unchanged
//! table may return the same value, so insert each accepted ID before asking
//! for the next one (or use [`assign_id`], which does both).

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::IdConfig;
use crate::diag::note;
use crate::error::{Error, Result};
use crate::format_descriptor::FormatDescriptor;
use crate::id_table::{Id, IdTable};
use crate::reverse_index::ReverseIndex;

/// A warning is emitted once fewer than `interval >> LOW_FREE_SHIFT` IDs
/// (25 %) remain free.
pub const LOW_FREE_SHIFT: u32 = 2;

/// Policy for choosing a free ID inside `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMethod {
    /// Uniform random draw, redrawn on collision. Spreads IDs so independent
    /// branches allocating before a merge rarely collide.
    Random,
    /// Smallest free ID.
    Upward,
    /// Largest free ID.
    Downward,
}

impl SearchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMethod::Random => "random",
            SearchMethod::Upward => "upward",
            SearchMethod::Downward => "downward",
        }
    }
}

impl fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "random" => Ok(SearchMethod::Random),
            "upward" => Ok(SearchMethod::Upward),
            "downward" => Ok(SearchMethod::Downward),
            other => Err(Error::UnknownSearchMethod(other.to_string())),
        }
    }
}

/// Returns an ID in `[min, max]` that is not a key of `table`.
///
/// # Errors
///
/// * [`Error::InvalidRange`] if `max < min`
/// * [`Error::RangeExhausted`] if every ID of the interval is taken
///
/// # Examples
///
/// ```
/// # use logid::{allocate, FormatDescriptor, Id, IdTable, SearchMethod};
/// let table: IdTable = [3, 4, 5]
///     .into_iter()
///     .map(|n| (Id(n), FormatDescriptor::new("TRICE8", "x")))
///     .collect();
/// let mut diag = Vec::new();
/// assert_eq!(allocate(&table, Id(1), Id(10), SearchMethod::Upward, &mut diag).unwrap(), Id(1));
/// assert_eq!(allocate(&table, Id(1), Id(10), SearchMethod::Downward, &mut diag).unwrap(), Id(10));
/// ```
pub fn allocate(
    table: &IdTable,
    min: Id,
    max: Id,
    method: SearchMethod,
    w: &mut dyn Write,
) -> Result<Id> {
    allocate_with_rng(table, min, max, method, &mut rand::thread_rng(), w)
}

/// Like [`allocate`], drawing random candidates from `rng`.
pub fn allocate_with_rng<R: Rng + ?Sized>(
    table: &IdTable,
    min: Id,
    max: Id,
    method: SearchMethod,
    rng: &mut R,
    w: &mut dyn Write,
) -> Result<Id> {
    debug!(%min, %max, %method, used = table.len(), "allocating ID");
    check_room(table, min, max, w)?;
    let id = match method {
        SearchMethod::Random => random_id(table, min, max, rng, w),
        SearchMethod::Upward => upward_id(table, min),
        SearchMethod::Downward => downward_id(table, max),
    };
    debug!(%id, "allocated ID");
    Ok(id)
}

/// Like [`allocate`], with the search method given by name.
///
/// An unknown name is reported as [`Error::UnknownSearchMethod`], which is
/// advisory for the configuration but leaves the caller without a usable ID.
pub fn allocate_by_name(
    table: &IdTable,
    min: Id,
    max: Id,
    method: &str,
    w: &mut dyn Write,
) -> Result<Id> {
    let method = method.parse::<SearchMethod>().map_err(|e| {
        warn!(method, "unknown ID search method");
        e
    })?;
    allocate(table, min, max, method, w)
}

/// Returns the ID for `descriptor`, reusing an existing one when an
/// equivalent descriptor is already in `table`, otherwise allocating a new
/// ID per `config` and inserting it.
pub fn assign_id(
    table: &mut IdTable,
    descriptor: FormatDescriptor,
    config: &IdConfig,
    w: &mut dyn Write,
) -> Result<Id> {
    if let Some(id) = ReverseIndex::build(table).first(&descriptor) {
        debug!(%id, %descriptor, "reusing ID of identical format");
        return Ok(id);
    }
    config.validate()?;
    let id = allocate(table, config.min_id(), config.max_id(), config.method, w)?;
    info!(%id, %descriptor, "assigned new ID");
    table.insert(id, descriptor);
    Ok(id)
}

/// Validates the interval and reports how many IDs are free in it.
///
/// Every key of the table counts as used, wherever it lies. Keys outside the
/// interval only make the count pessimistic, so a positive result still
/// guarantees a free ID inside it.
fn check_room(table: &IdTable, min: Id, max: Id, w: &mut dyn Write) -> Result<u64> {
    if max < min {
        return Err(Error::InvalidRange {
            min: min.0,
            max: max.0,
        });
    }
    let interval = u64::from(max.0 - min.0) + 1;
    let used = table.len();
    let free = interval.saturating_sub(used as u64);
    if free == 0 {
        return Err(Error::RangeExhausted {
            min: min.0,
            max: max.0,
            used,
        });
    }
    if free < interval >> LOW_FREE_SHIFT {
        warn!(%min, %max, free, "less than 25% of IDs free");
        note(w, format_args!("WARNING: Less than 25% IDs free! ({free} of {interval} in [{min}, {max}])"));
    }
    Ok(free)
}

fn random_id<R: Rng + ?Sized>(
    table: &IdTable,
    min: Id,
    max: Id,
    rng: &mut R,
    w: &mut dyn Write,
) -> Id {
    if table.is_empty() {
        return min;
    }
    loop {
        let id = Id(rng.gen_range(min.0..=max.0));
        if !table.contains(id) {
            return id;
        }
        debug!(%id, "random ID in use, redrawing");
        note(w, format_args!("ID {id} used, next try..."));
    }
}

// Both directional searches terminate inside the interval: check_room has
// already established that it holds a free ID.

fn upward_id(table: &IdTable, min: Id) -> Id {
    let mut id = min;
    while table.contains(id) {
        id.0 += 1;
    }
    id
}

fn downward_id(table: &IdTable, max: Id) -> Id {
    let mut id = max;
    while table.contains(id) {
        id.0 -= 1;
    }
    id
}
