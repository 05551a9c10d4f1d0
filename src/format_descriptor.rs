use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// The static shape of one log statement.
///
/// A descriptor pairs the statement's type tag (for example `TRICE16` or
/// `trice8_2`, naming value width and, optionally, argument count) with its
/// printf-style format string. It is what an ID stands for on the wire.
///
/// Type tags are case-insensitive: `trice16` and `TRICE16` describe the same
/// statement shape, so equality and hashing both compare the uppercased tag.
/// The format string is compared exactly.
///
/// # Examples
///
/// ```
/// # use logid::FormatDescriptor;
/// let a = FormatDescriptor::new("trice16", "x=%d");
/// let b = FormatDescriptor::new("TRICE16", "x=%d");
/// assert_eq!(a, b);
/// assert_ne!(a, FormatDescriptor::new("TRICE16", "x=%u"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatDescriptor {
    #[serde(rename = "Type")]
    type_tag: String,
    #[serde(rename = "Strg")]
    format: String,
}

impl FormatDescriptor {
    pub fn new(type_tag: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            format: format.into(),
        }
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// Same descriptor with the type tag uppercased.
    pub fn normalized(&self) -> Self {
        Self {
            type_tag: self.type_tag.to_uppercase(),
            format: self.format.clone(),
        }
    }

    /// Same format string under a different type tag.
    pub fn with_type_tag(&self, type_tag: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            format: self.format.clone(),
        }
    }
}

impl PartialEq for FormatDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.format == other.format && self.type_tag.to_uppercase() == other.type_tag.to_uppercase()
    }
}

impl Eq for FormatDescriptor {}

impl Hash for FormatDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must agree with `eq`.
        self.type_tag.to_uppercase().hash(state);
        self.format.hash(state);
    }
}

impl fmt::Display for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.type_tag, self.format)
    }
}
