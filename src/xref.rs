//! Cross-reference table and trailer serialization.
//!
//! The classic xref table maps object numbers to byte offsets, one
//! fixed-width 20-byte line per object:
//!
//! ```text
//! xref
//! 0 4
//! 0000000000 65535 f
//! 0000000000 00000 n
//! 0000000000 65535 f
//! 0000000020 00000 n
//! ```
//!
//! Values that do not fit the 10-digit offset or 5-digit generation fields
//! are rejected rather than truncated.

use crate::config::DuplicatePolicy;
use crate::error::{Error, Result, XRefField};
use crate::scanner::ObjectRecord;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;

/// Largest offset representable in the 10-digit field.
pub const MAX_OFFSET: u64 = 9_999_999_999;

/// Largest generation representable in the 5-digit field.
pub const MAX_GENERATION: u32 = 99_999;

/// Generation number used for free entries.
pub const FREE_GENERATION: u32 = 65_535;

/// Cross-reference table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XRefEntry {
    /// Byte offset (in use) or next free object number (free)
    pub offset: u64,
    /// Generation number
    pub generation: u32,
    /// Whether the object is in use
    pub in_use: bool,
}

impl XRefEntry {
    /// Create an in-use entry.
    pub fn in_use(offset: u64, generation: u32) -> Self {
        Self {
            offset,
            generation,
            in_use: true,
        }
    }

    /// Create a free entry.
    pub fn free(next_free: u64, generation: u32) -> Self {
        Self {
            offset: next_free,
            generation,
            in_use: false,
        }
    }

    /// The `0000000000 65535 f` entry used for object 0 and for gaps.
    pub fn free_head() -> Self {
        Self::free(0, FREE_GENERATION)
    }

    /// Write this entry as a 20-byte line for `object`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FieldOverflow`] if the offset needs more than 10
    /// digits or the generation more than 5.
    pub fn write_line<W: Write>(&self, object: u32, out: &mut W) -> Result<()> {
        if self.offset > MAX_OFFSET {
            return Err(Error::FieldOverflow {
                object,
                field: XRefField::Offset,
                value: self.offset,
                width: 10,
            });
        }
        if self.generation > MAX_GENERATION {
            return Err(Error::FieldOverflow {
                object,
                field: XRefField::Generation,
                value: u64::from(self.generation),
                width: 5,
            });
        }

        let flag = if self.in_use { 'n' } else { 'f' };
        writeln!(out, "{:010} {:05} {} ", self.offset, self.generation, flag)?;
        Ok(())
    }
}

/// Cross-reference table covering object numbers `0..size`.
///
/// Object 0 is always the free-list head; any number without an entry
/// is emitted as free.
#[derive(Debug, Clone, Default)]
pub struct CrossRefTable {
    entries: HashMap<u32, XRefEntry>,
}

impl CrossRefTable {
    /// Create a new empty cross-reference table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from scanned records.
    ///
    /// `records` must be in scan order so `policy` can tell earlier and
    /// later definitions of the same object number apart.
    pub fn from_records(records: &[ObjectRecord], policy: DuplicatePolicy) -> Self {
        let mut table = Self::new();

        for record in records {
            if record.number == 0 {
                log::warn!("Ignoring object 0 at offset {}: reserved for the free list", record.offset);
                continue;
            }

            let entry = XRefEntry::in_use(record.offset, record.generation);
            match policy {
                DuplicatePolicy::FirstWins => {
                    if table.contains(record.number) {
                        log::debug!(
                            "Keeping first definition of object {}, ignoring offset {}",
                            record.number,
                            record.offset
                        );
                        continue;
                    }
                    table.add_entry(record.number, entry);
                },
                DuplicatePolicy::LastWins => {
                    if let Some(previous) = table.get(record.number) {
                        log::debug!(
                            "Object {} redefined at offset {} (was {})",
                            record.number,
                            record.offset,
                            previous.offset
                        );
                    }
                    table.add_entry(record.number, entry);
                },
            }
        }

        table
    }

    /// Add an entry, replacing any existing one for `object_number`.
    pub fn add_entry(&mut self, object_number: u32, entry: XRefEntry) {
        self.entries.insert(object_number, entry);
    }

    /// Get an explicit entry by object number.
    pub fn get(&self, object_number: u32) -> Option<&XRefEntry> {
        self.entries.get(&object_number)
    }

    /// Check if an object has an explicit entry.
    pub fn contains(&self, object_number: u32) -> bool {
        self.entries.contains_key(&object_number)
    }

    /// Number of explicit entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no explicit entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest object number with an entry, 0 if none.
    pub fn max_object_number(&self) -> u32 {
        self.entries.keys().copied().max().unwrap_or(0)
    }

    /// Number of table lines: highest object number plus one.
    pub fn size(&self) -> u64 {
        u64::from(self.max_object_number()) + 1
    }

    /// The entry emitted for `object_number`, filling gaps with free entries.
    pub fn entry_for(&self, object_number: u32) -> XRefEntry {
        if object_number == 0 {
            return XRefEntry::free_head();
        }
        self.get(object_number)
            .copied()
            .unwrap_or_else(XRefEntry::free_head)
    }

    /// Write the `xref` section: keyword, subsection header, and one line
    /// per object number.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "xref")?;
        writeln!(out, "0 {}", self.size())?;

        for object_number in 0..=self.max_object_number() {
            self.entry_for(object_number).write_line(object_number, out)?;
        }
        Ok(())
    }

    /// Serialize the `xref` section to a byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(16 + self.size() as usize * 20);
        self.write_to(&mut out)?;
        Ok(out)
    }
}

/// Trailer dictionary of the rebuilt document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Trailer {
    /// Number of xref entries
    pub size: u64,
    /// Catalog object number, referenced with generation 0
    pub root: Option<u32>,
}

impl Trailer {
    /// Write the `trailer` keyword and dictionary.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "trailer")?;
        writeln!(out, "<<")?;
        writeln!(out, "  /Size {}", self.size)?;
        if let Some(root) = self.root {
            writeln!(out, "  /Root {} 0 R", root)?;
        }
        writeln!(out, ">>")?;
        Ok(())
    }
}
