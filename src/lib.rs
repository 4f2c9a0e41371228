// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # PDF Xref Fix
//!
//! Rebuilds the cross-reference table and trailer of a PDF body so that
//! every offset matches the final byte layout.
//!
//! ## Pipeline
//! - **Footer removal**: drop a stale `xref`/`trailer`/`startxref` section
//! - **Object discovery**: scan `N G obj` headers and record byte offsets
//! - **Catalog lookup**: find the `/Type /Catalog` object for `/Root`
//! - **Footer assembly**: fixed-width xref table, trailer, `startxref`, `%%EOF`
//!
//! Full object parsing, encryption, linearization, and cross-reference
//! streams are out of scope.
//!
//! ## Quick Start
//!
//! ```
//! let body = b"1 0 obj\n<<>>\nendobj\n3 0 obj\n<</Type/Catalog>>\nendobj\n";
//! let pdf = pdf_xref_fix::rebuild(body)?;
//!
//! let text = String::from_utf8_lossy(&pdf);
//! assert!(text.contains("0 4\n0000000000 65535 f \n"));
//! assert!(text.contains("/Root 3 0 R"));
//! # Ok::<(), pdf_xref_fix::Error>(())
//! ```
//!
//! Use [`RebuildOptions::robust`] for bodies with binary streams:
//!
//! ```
//! use pdf_xref_fix::{RebuildOptions, XrefRebuilder};
//!
//! let rebuilder = XrefRebuilder::with_options(RebuildOptions::robust());
//! let report = rebuilder.analyze(b"1 0 obj\n<<>>\nstream\n9 0 obj\nendstream\nendobj\n")?;
//! assert_eq!(report.trailer.size, 2);
//! # Ok::<(), pdf_xref_fix::Error>(())
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Options
pub mod config;

// Rebuild pipeline
pub mod footer;
pub mod rebuilder;
pub mod scanner;
pub mod xref;

// Re-exports
pub use config::{DuplicatePolicy, FooterStrategy, RebuildOptions};
pub use error::{Error, Result};
pub use rebuilder::{rebuild, RebuildReport, XrefRebuilder};
pub use scanner::ObjectRecord;
pub use xref::{CrossRefTable, Trailer, XRefEntry};

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
