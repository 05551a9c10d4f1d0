//! Format-specifier count reconciliation.
//!
//! Some encodings need to know how many values a statement carries. Type tags
//! such as `TRICE16` leave that implicit; this pass derives the count from the
//! format string and makes it explicit (`TRICE16` with `"hi %03u, %5x"`
//! becomes `TRICE16_2`). Tags that already carry a count marker are left
//! alone, which makes the pass idempotent.

use std::io::Write;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use crate::diag::note;
use crate::error::{Error, Result};
use crate::id_table::{Id, IdTable};

/// Largest specifier count a type tag may encode.
pub const MAX_FORMAT_SPECIFIERS: usize = 12;

lazy_static! {
    /// One printf-style conversion, anchored at a `%`.
    ///
    /// Flags, width, precision and C length modifiers are accepted before the
    /// conversion character, which is captured in group 1.
    static ref SPECIFIER: Regex = Regex::new(
        r"^%[-+ #0]*(?:\d+|\*)?(?:\.(?:\d+|\*))?(?:hh|h|ll|l|L|j|z)?([bcdeEfFgGaAiouxXspnqtTv%])"
    )
    .unwrap();
}

/// Counts the value-consuming conversions in a printf-style format string.
/// `%%` is a literal percent sign and does not count.
///
/// # Examples
///
/// ```
/// # use logid::count_format_specifiers;
/// assert_eq!(count_format_specifiers("hi %03u, %5x").unwrap(), 2);
/// assert_eq!(count_format_specifiers("100%% done").unwrap(), 0);
/// assert!(count_format_specifiers("dangling %").is_err());
/// ```
pub fn count_format_specifiers(format: &str) -> Result<usize> {
    let mut count = 0;
    let mut pos = 0;
    while let Some(offset) = format[pos..].find('%') {
        let start = pos + offset;
        let caps = SPECIFIER
            .captures(&format[start..])
            .ok_or_else(|| Error::malformed_format(format, start))?;
        if &caps[1] != "%" {
            count += 1;
        }
        pos = start + caps[0].len();
    }
    Ok(count)
}

/// True if `type_tag` already encodes a specifier count (`TRICE0`,
/// `Trice8_2`, ...).
pub fn has_specifier_count(type_tag: &str) -> bool {
    type_tag.contains(['0', '_'])
}

/// `type_tag` with the count `n` appended.
pub fn counted_type_tag(type_tag: &str, n: usize) -> String {
    format!("{type_tag}_{n}")
}

/// What a [`reconcile`] pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// IDs whose type tag was rewritten.
    pub updated: Vec<Id>,
    /// IDs left untouched because their format string could not be counted
    /// or yielded more than [`MAX_FORMAT_SPECIFIERS`].
    pub skipped: Vec<Id>,
}

/// Adds the specifier count to every type tag in `table` that lacks one.
///
/// Entries whose format string is malformed are skipped with a warning on `w`;
/// the rest of the pass still runs.
pub fn reconcile(table: &mut IdTable, w: &mut dyn Write) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    let mut updates = Vec::new();

    for (&id, descriptor) in table.iter() {
        if has_specifier_count(descriptor.type_tag()) {
            continue;
        }
        match count_format_specifiers(descriptor.format()) {
            Ok(n) if n <= MAX_FORMAT_SPECIFIERS => {
                let tag = counted_type_tag(descriptor.type_tag(), n);
                updates.push((id, descriptor.with_type_tag(tag)));
            }
            Ok(n) => {
                warn!(%id, count = n, "too many format specifiers, type tag left unchanged");
                note(
                    w,
                    format_args!(
                        "ID {id}: unexpected parameter count {n} (max {MAX_FORMAT_SPECIFIERS}) in {descriptor}, please check."
                    ),
                );
                report.skipped.push(id);
            }
            Err(e) => {
                warn!(%id, error = %e, "cannot count format specifiers, type tag left unchanged");
                note(w, format_args!("ID {id}: {e}, type tag left unchanged."));
                report.skipped.push(id);
            }
        }
    }

    for (id, descriptor) in updates {
        debug!(%id, type_tag = descriptor.type_tag(), "added specifier count");
        table.insert(id, descriptor);
        report.updated.push(id);
    }
    report
}
