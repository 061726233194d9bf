//! Flat-markdown bulk-transfer codec for Juday.
//!
//! Converts between a user's full sheet set and one text document. Pure
//! synchronous; no HTTP or database dependencies.
//!
//! # Format
//!
//! ```text
//! ---2024-01-01
//!
//! body line 1
//! body line 2
//!
//!
//! ---2024-01-02
//!
//! body...
//! ```
//!
//! Each block starts with a separator line: three hyphens immediately
//! followed by the sheet's `YYYY-MM-DD` day, no space. The writer puts one
//! blank line after the separator and two between entries; the parser
//! tolerates any amount of blank-line padding and CRLF endings.

mod parse;
mod serialize;

pub use parse::{ArchiveEntry, ParsedArchive, parse_archive};
pub use serialize::{export_filename, write_archive};

// ─── Round-trip tests ────────────────────────────────────────────────────────
