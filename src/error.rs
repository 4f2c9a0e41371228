//! Error types for the xref rebuilder.
//!
//! Only a handful of conditions are fatal: a value that does not fit its
//! fixed-width xref field, an object number range too large to tabulate,
//! and digit groups that overflow while scanning. Missing objects or a
//! missing catalog are not errors.

/// Result type alias for rebuild operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Name of a fixed-width cross-reference entry field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XRefField {
    /// 10-digit byte offset
    Offset,
    /// 5-digit generation number
    Generation,
}

impl std::fmt::Display for XRefField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            XRefField::Offset => write!(f, "offset"),
            XRefField::Generation => write!(f, "generation"),
        }
    }
}

/// Error types that can occur while rebuilding a cross-reference table.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A value cannot be represented in its fixed-width xref field
    #[error("Object {object}: {field} {value} does not fit in {width} digits")]
    FieldOverflow {
        /// Object number of the offending entry
        object: u32,
        /// Which field overflowed
        field: XRefField,
        /// The value that was rejected
        value: u64,
        /// Width of the field in digits
        width: usize,
    },

    /// The object number range implies an unreasonably large table
    #[error("Cross-reference table too large: {size} entries (limit {limit})")]
    TableTooLarge {
        /// Requested table size (max object number + 1)
        size: u64,
        /// Configured limit
        limit: u64,
    },

    /// A digit group in an object header does not fit its integer type
    #[error("Number out of range in object header at byte {offset}: {digits}")]
    NumberOutOfRange {
        /// Byte offset of the object header
        offset: usize,
        /// The digits as found in the body
        digits: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON report serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
