//! Object header discovery.
//!
//! Scans a document body for "N G obj" markers and records where each
//! object begins. Also locates the document catalog so the rebuilt
//! trailer can point at it.
//!
//! The scan is textual: no object is parsed. Optionally, byte ranges
//! between `stream` and `endstream` are excluded, since compressed or
//! binary stream data can contain byte sequences that look like headers.

use crate::config::RebuildOptions;
use crate::error::{Error, Result};
use lazy_static::lazy_static;
use serde::Serialize;
use std::ops::Range;
use std::str::FromStr;

lazy_static! {
    /// Regex for finding "N G obj" patterns
    static ref RE_OBJ_PATTERN: regex::bytes::Regex = regex::bytes::Regex::new(r"(?-u)(\d+)\s+(\d+)\s+obj").unwrap();

    /// `stream` keyword followed by its end-of-line marker
    static ref RE_STREAM_START: regex::bytes::Regex =
        regex::bytes::Regex::new(r"(?-u)\bstream(?:\r\n|\r|\n)").unwrap();

    static ref RE_STREAM_END: regex::bytes::Regex = regex::bytes::Regex::new(r"(?-u)endstream").unwrap();

    /// Catalog type marker, e.g. "/Type /Catalog" or "/Type/Catalog"
    static ref RE_CATALOG: regex::bytes::Regex = regex::bytes::Regex::new(r"(?i-u)/Type\s*/Catalog\b").unwrap();
}

/// An object header discovered in the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObjectRecord {
    /// Object number
    pub number: u32,
    /// Generation number
    pub generation: u32,
    /// Byte offset of the header in the cleaned body
    pub offset: u64,
    /// Always true for discovered objects
    pub in_use: bool,
}

impl ObjectRecord {
    /// Create an in-use record.
    pub fn new(number: u32, generation: u32, offset: u64) -> Self {
        Self {
            number,
            generation,
            offset,
            in_use: true,
        }
    }
}

/// Find all object headers in `body`, in scan (ascending offset) order.
///
/// # Errors
///
/// Returns [`Error::NumberOutOfRange`] if an object or generation number
/// does not fit in 32 bits.
pub fn scan_objects(body: &[u8], options: &RebuildOptions) -> Result<Vec<ObjectRecord>> {
    let spans = if options.skip_stream_data {
        stream_data_spans(body)
    } else {
        Vec::new()
    };
    let mut spans_iter = spans.iter().peekable();

    let mut records = Vec::new();

    for capture in RE_OBJ_PATTERN.captures_iter(body) {
        let (Some(full_match), Some(num_match), Some(gen_match)) =
            (capture.get(0), capture.get(1), capture.get(2))
        else {
            continue;
        };
        let offset = full_match.start();

        // Matches arrive in ascending order, so spans ending before them are done
        while spans_iter.peek().is_some_and(|span| span.end <= offset) {
            spans_iter.next();
        }
        if spans_iter.peek().is_some_and(|span| span.contains(&offset)) {
            log::debug!("Skipping object header inside stream data at offset {}", offset);
            continue;
        }

        if options.validate_headers && !is_followed_by_object(body, full_match.end()) {
            log::debug!("Skipping false positive object header at offset {}", offset);
            continue;
        }

        let number: u32 = parse_digits(num_match.as_bytes(), offset)?;
        let generation: u32 = parse_digits(gen_match.as_bytes(), offset)?;

        log::debug!("Found object {} gen {} at offset {}", number, generation, offset);
        records.push(ObjectRecord::new(number, generation, offset as u64));
    }

    if records.is_empty() {
        log::warn!("No object headers found in {} byte body", body.len());
    } else {
        log::info!("Found {} object headers", records.len());
    }

    Ok(records)
}

/// Byte ranges of stream data, from just after the `stream` end-of-line
/// marker up to the matching `endstream`.
///
/// An unterminated stream runs to the end of the body.
pub fn stream_data_spans(body: &[u8]) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut pos = 0;

    while let Some(start) = RE_STREAM_START.find_at(body, pos) {
        let data_start = start.end();
        match RE_STREAM_END.find_at(body, data_start) {
            Some(end) => {
                spans.push(data_start..end.start());
                pos = end.end();
            },
            None => {
                log::warn!("Unterminated stream starting at offset {}", data_start);
                spans.push(data_start..body.len());
                break;
            },
        }
    }

    spans
}

/// Find the object number of the document catalog.
///
/// The catalog is the object whose header is the nearest one before the
/// first `/Type /Catalog` marker. `records` must be in scan order.
pub fn find_catalog(body: &[u8], records: &[ObjectRecord], options: &RebuildOptions) -> Option<u32> {
    let spans = if options.skip_stream_data {
        stream_data_spans(body)
    } else {
        Vec::new()
    };

    let marker = RE_CATALOG
        .find_iter(body)
        .find(|m| !spans.iter().any(|span| span.contains(&m.start())))?;

    let catalog = records
        .iter()
        .take_while(|record| record.offset < marker.start() as u64)
        .last();

    match catalog {
        Some(record) => {
            log::info!("Found catalog: object {} gen {}", record.number, record.generation);
            Some(record.number)
        },
        None => {
            log::warn!("Catalog marker at offset {} has no preceding object header", marker.start());
            None
        },
    }
}

/// Check that the bytes after an `obj` keyword can begin a PDF object.
fn is_followed_by_object(body: &[u8], after_keyword: usize) -> bool {
    let next = body[after_keyword..]
        .iter()
        .copied()
        .find(|byte| !byte.is_ascii_whitespace());

    match next {
        // Header at end of input: nothing to contradict it
        None => true,
        Some(byte) => {
            matches!(byte, b'<' | b'[' | b'(' | b'/' | b't' | b'f' | b'n' | b'-' | b'+' | b'.')
                || byte.is_ascii_digit()
        },
    }
}

fn parse_digits<T: FromStr>(digits: &[u8], offset: usize) -> Result<T> {
    std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::NumberOutOfRange {
            offset,
            digits: String::from_utf8_lossy(digits).into_owned(),
        })
}
