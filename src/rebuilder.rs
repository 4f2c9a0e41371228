//! Cross-reference rebuilding.
//!
//! Turns a PDF body (with or without a stale footer) into a complete PDF
//! whose xref table, trailer, and `startxref` pointer agree with the
//! actual byte layout:
//!
//! 1. strip the old footer,
//! 2. scan object headers,
//! 3. find the catalog,
//! 4. append `xref`, `trailer`, `startxref`, and `%%EOF`.
//!
//! # Example
//!
//! ```
//! use pdf_xref_fix::rebuilder::XrefRebuilder;
//!
//! let body = b"1 0 obj\n<< /Type /Catalog >>\nendobj\n";
//! let pdf = XrefRebuilder::new().rebuild(body).unwrap();
//! let text = String::from_utf8(pdf).unwrap();
//! assert!(text.contains("  /Root 1 0 R\n"));
//! assert!(text.ends_with("startxref\n37\n%%EOF\n"));
//! ```

use crate::config::RebuildOptions;
use crate::error::{Error, Result};
use crate::footer::strip_footer;
use crate::scanner::{find_catalog, scan_objects, ObjectRecord};
use crate::xref::{CrossRefTable, Trailer};
use serde::Serialize;
use std::io::Write;

/// Summary of a rebuild, without the output bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebuildReport {
    /// Length of the body after footer stripping
    pub body_len: u64,
    /// Number of footer bytes removed from the input
    pub stripped_bytes: u64,
    /// Discovered objects, sorted by object number (scan order among equals)
    pub objects: Vec<ObjectRecord>,
    /// Trailer written after the table
    pub trailer: Trailer,
    /// Byte offset of the `xref` keyword in the output
    pub startxref: u64,
}

/// Rebuilds the cross-reference section of a PDF body.
#[derive(Debug, Clone, Default)]
pub struct XrefRebuilder {
    options: RebuildOptions,
}

/// Intermediate result shared by `analyze` and `rebuild`.
struct Plan<'a> {
    body: &'a [u8],
    table: CrossRefTable,
    report: RebuildReport,
}

impl XrefRebuilder {
    /// Create a rebuilder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a rebuilder with custom options.
    pub fn with_options(options: RebuildOptions) -> Self {
        Self { options }
    }

    /// Options in effect.
    pub fn options(&self) -> &RebuildOptions {
        &self.options
    }

    /// Rebuild `data` into a complete PDF.
    ///
    /// # Errors
    ///
    /// Fails without producing output if an offset or generation does not
    /// fit its xref field, if the object number range exceeds
    /// [`RebuildOptions::max_table_size`], or if a header number overflows.
    pub fn rebuild(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.rebuild_with_report(data).map(|(pdf, _)| pdf)
    }

    /// Rebuild `data` and also return the [`RebuildReport`].
    pub fn rebuild_with_report(&self, data: &[u8]) -> Result<(Vec<u8>, RebuildReport)> {
        let plan = self.plan(data)?;

        // Serialize the table first so an overflow aborts before any copying
        let xref_section = plan.table.to_bytes()?;

        let mut out = Vec::with_capacity(plan.body.len() + xref_section.len() + 128);
        out.extend_from_slice(plan.body);
        out.push(b'\n');
        out.extend_from_slice(&xref_section);
        out.push(b'\n');
        plan.report.trailer.write_to(&mut out)?;
        out.push(b'\n');
        writeln!(out, "startxref")?;
        writeln!(out, "{}", plan.report.startxref)?;
        writeln!(out, "%%EOF")?;

        log::info!(
            "Rebuilt xref: {} objects, /Size {}, startxref {}",
            plan.report.objects.len(),
            plan.report.trailer.size,
            plan.report.startxref
        );

        Ok((out, plan.report))
    }

    /// Compute the report for `data` without serializing the output.
    ///
    /// Fails on the same conditions as [`rebuild`](Self::rebuild).
    pub fn analyze(&self, data: &[u8]) -> Result<RebuildReport> {
        let plan = self.plan(data)?;
        plan.table.to_bytes()?;
        Ok(plan.report)
    }

    fn plan<'a>(&self, data: &'a [u8]) -> Result<Plan<'a>> {
        let body = strip_footer(data, self.options.footer);

        let mut objects = scan_objects(body, &self.options)?;
        let table = CrossRefTable::from_records(&objects, self.options.duplicates);

        let size = table.size();
        if !self.options.allows_table_size(size) {
            return Err(Error::TableTooLarge {
                size,
                limit: self.options.max_table_size,
            });
        }

        let root = find_catalog(body, &objects, &self.options);
        if root.is_none() {
            log::info!("No catalog found, trailer will omit /Root");
        }

        // Stable sort keeps scan order among duplicate numbers
        objects.sort_by_key(|record| record.number);

        let report = RebuildReport {
            body_len: body.len() as u64,
            stripped_bytes: (data.len() - body.len()) as u64,
            objects,
            trailer: Trailer { size, root },
            // The body is followed by one newline before `xref`
            startxref: body.len() as u64 + 1,
        };

        Ok(Plan {
            body,
            table,
            report,
        })
    }
}

/// Rebuild `data` with default options.
///
/// Shorthand for `XrefRebuilder::new().rebuild(data)`.
pub fn rebuild(data: &[u8]) -> Result<Vec<u8>> {
    XrefRebuilder::new().rebuild(data)
}
