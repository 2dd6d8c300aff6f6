//! # checkpack
//!
//! Export tooling for an offline event check-in app.
//!
//! Guests checked in at an event are exported either as a plain CSV file or
//! as a ZIP bundle holding `checkins.csv` plus one PNG per captured
//! signature. The archive writer produces stored (uncompressed) ZIP files
//! that any standard unzip tool can open, and the bundled reader can list
//! and CRC-test them again.
//!
//! ## Features
//!
//! - Byte-exact stored ZIP writer with a table-driven CRC-32
//! - Reader for listing, extracting and testing stored archives
//! - Roster loading from the app's JSON storage format
//! - CSV export and signature data-URL decoding
//!
//! ## Example
//!
//! ```
//! use checkpack::zip::{ArchiveEntry, build_archive};
//!
//! let zip = build_archive(&[
//!     ArchiveEntry::new("checkins.csv", b"\"name\"\n".to_vec()),
//!     ArchiveEntry::new("signatures/ada_1.png", vec![0x89, b'P', b'N', b'G']),
//! ])?;
//! assert_eq!(&zip[..4], b"PK\x03\x04");
//! # Ok::<(), checkpack::zip::ArchiveError>(())
//! ```

pub mod cli;
pub mod export;
pub mod io;
pub mod roster;
pub mod zip;

pub use cli::Cli;
pub use export::{BundleOptions, ExportError, build_bundle, roster_to_csv};
pub use io::{LocalFileReader, MemoryReader, ReadAt};
pub use roster::{Guest, Roster, RosterError};
pub use zip::{ArchiveEntry, ArchiveError, ZipExtractor, ZipFileEntry, build_archive};
