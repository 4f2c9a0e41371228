//! Rebuild options.
//!
//! These options trade strict compatibility with the legacy footer-fixing
//! behavior for robustness against object-like bytes in stream data and
//! incidental `xref` tokens.
//!
//! # Example
//!
//! ```
//! use pdf_xref_fix::config::{DuplicatePolicy, RebuildOptions};
//!
//! // Legacy behavior (default)
//! let legacy = RebuildOptions::legacy();
//!
//! // Stream-aware scanning and last-startxref footer stripping
//! let robust = RebuildOptions::robust();
//!
//! // Custom configuration
//! let custom = RebuildOptions::default()
//!     .with_duplicate_policy(DuplicatePolicy::FirstWins)
//!     .with_max_table_size(1_000_000);
//! assert_eq!(custom.max_table_size, 1_000_000);
//! ```

use serde::Serialize;

/// PDF implementation limit on indirect objects (ISO 32000-1, Annex C)
/// plus the free-list head.
pub const DEFAULT_MAX_TABLE_SIZE: u64 = 8_388_608;

/// How an existing footer (xref table, trailer, startxref, %%EOF) is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FooterStrategy {
    /// Strip from the first case-insensitive `xref` (and the newlines
    /// right before it) through the end of input.
    FirstXrefToken,
    /// Strip from the footer boundary preceding the last `startxref`.
    LastStartxref,
    /// Body is already stripped; keep it as is.
    None,
}

/// Which occurrence of a repeated object number owns the table slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DuplicatePolicy {
    /// The first header in scan order wins
    FirstWins,
    /// The last header in scan order wins (incremental-update semantics)
    LastWins,
}

/// Options for [`XrefRebuilder`](crate::rebuilder::XrefRebuilder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RebuildOptions {
    /// Footer removal strategy
    pub footer: FooterStrategy,

    /// Ignore object headers found inside `stream`...`endstream` data
    pub skip_stream_data: bool,

    /// Reject headers whose next non-whitespace byte cannot start an object
    pub validate_headers: bool,

    /// Duplicate object number resolution
    pub duplicates: DuplicatePolicy,

    /// Maximum number of table entries (max object number + 1)
    ///
    /// Default: 8,388,608. Set to 0 to disable the check.
    pub max_table_size: u64,
}

impl Default for RebuildOptions {
    fn default() -> Self {
        Self::legacy()
    }
}

impl RebuildOptions {
    /// Legacy mode: first `xref` token footer stripping, plain header scan.
    pub fn legacy() -> Self {
        Self {
            footer: FooterStrategy::FirstXrefToken,
            skip_stream_data: false,
            validate_headers: false,
            duplicates: DuplicatePolicy::LastWins,
            max_table_size: DEFAULT_MAX_TABLE_SIZE,
        }
    }

    /// Robust mode: stream-aware scan, header validation, and footer
    /// stripping anchored on the last `startxref`.
    ///
    /// Use this for bodies carrying binary streams or embedded `xref` text.
    pub fn robust() -> Self {
        Self {
            footer: FooterStrategy::LastStartxref,
            skip_stream_data: true,
            validate_headers: true,
            duplicates: DuplicatePolicy::LastWins,
            max_table_size: DEFAULT_MAX_TABLE_SIZE,
        }
    }

    /// Set the footer strategy.
    pub fn with_footer(mut self, footer: FooterStrategy) -> Self {
        self.footer = footer;
        self
    }

    /// Set the duplicate policy.
    pub fn with_duplicate_policy(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    /// Set the table size limit (0 = unlimited).
    pub fn with_max_table_size(mut self, max_table_size: u64) -> Self {
        self.max_table_size = max_table_size;
        self
    }

    /// Enable or disable stream-aware scanning.
    pub fn with_skip_stream_data(mut self, skip: bool) -> Self {
        self.skip_stream_data = skip;
        self
    }

    /// Enable or disable header validation.
    pub fn with_validate_headers(mut self, validate: bool) -> Self {
        self.validate_headers = validate;
        self
    }

    /// Check a table size against the configured limit.
    pub(crate) fn allows_table_size(&self, size: u64) -> bool {
        self.max_table_size == 0 || size <= self.max_table_size
    }
}
