//! Stored ZIP archives: writing, reading back and integrity testing.
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! The [`writer`] emits exactly that layout with every entry stored
//! (method 0), zeroed timestamps and no comments. The [`parser`] and
//! [`extractor`] read it back starting from the EOCD, which is how the
//! `list` and `test` commands verify an exported bundle.
//!
//! ## Limitations
//!
//! - Classic format only: no ZIP64, at most 65535 entries, 4 GiB per field
//! - No compression, encryption or multi-disk archives

pub mod crc32;
mod extractor;
mod parser;
mod structures;
mod writer;

pub use crc32::{Crc32, crc32};
pub use extractor::{EntryCheck, ZipExtractor};
pub use parser::ZipParser;
pub use structures::*;
pub use writer::{ArchiveEntry, ArchiveError, build_archive};
