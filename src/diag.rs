use std::fmt;
use std::io::Write;

use tracing::warn;

/// Writes one line of operator-facing text to the diagnostic writer.
///
/// The text is advisory and nothing reads it back, so a failing writer only
/// gets logged; the operation that produced the note carries on.
pub(crate) fn note(w: &mut dyn Write, args: fmt::Arguments<'_>) {
    if let Err(e) = w.write_fmt(args).and_then(|()| w.write_all(b"\n")) {
        warn!(error = %e, "diagnostic writer failed, note dropped");
    }
}
