//! Stored (uncompressed) ZIP archive writer.
//!
//! The whole archive is assembled in memory:
//!
//! 1. A Local File Header followed by the raw bytes, for every entry
//! 2. One Central Directory File Header per entry, in the same order
//! 3. The End of Central Directory record, without a comment
//!
//! Timestamps are zeroed so the output depends only on the entries given.
//! Classic (non-ZIP64) limits apply: any count or length that does not fit
//! its field fails with [`ArchiveError::TooLarge`] and no bytes are returned.

use log::debug;
use thiserror::Error;

use super::crc32::crc32;
use super::structures::{CentralDirectoryHeader, EndOfCentralDirectory, LocalFileHeader};

/// Errors that can occur while building an archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// A value does not fit its fixed-width field
    #[error("Archive too large: {field} is {value}, limit is {limit}")]
    TooLarge {
        field: &'static str,
        value: u64,
        limit: u64,
    },

    /// Failure writing into the output buffer
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ArchiveError>;

/// One named payload to store in the archive.
///
/// Names use `/` as the path separator. Uniqueness is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Vec<u8>,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

fn fit_u16(field: &'static str, value: usize) -> Result<u16> {
    u16::try_from(value).map_err(|_| ArchiveError::TooLarge {
        field,
        value: value as u64,
        limit: u16::MAX as u64,
    })
}

fn fit_u32(field: &'static str, value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| ArchiveError::TooLarge {
        field,
        value: value as u64,
        limit: u32::MAX as u64,
    })
}

/// Build a stored ZIP archive from `entries`, in order.
pub fn build_archive(entries: &[ArchiveEntry]) -> Result<Vec<u8>> {
    let total_entries = fit_u16("entry count", entries.len())?;

    let body_len: usize = entries
        .iter()
        .map(|e| LocalFileHeader::SIZE + e.name.len() + e.data.len())
        .sum();
    let cd_len: usize = entries
        .iter()
        .map(|e| CentralDirectoryHeader::SIZE + e.name.len())
        .sum();
    let mut out = Vec::with_capacity(body_len + cd_len + EndOfCentralDirectory::SIZE);

    let mut central = Vec::with_capacity(entries.len());

    for entry in entries {
        let lfh_offset = fit_u32("local header offset", out.len())?;
        let name = entry.name.as_bytes();
        let file_name_length = fit_u16("file name length", name.len())?;
        let size = fit_u32("entry size", entry.data.len())?;
        let checksum = crc32(&entry.data);

        LocalFileHeader {
            crc32: checksum,
            size,
            file_name_length,
        }
        .write_to(&mut out)?;
        out.extend_from_slice(name);
        out.extend_from_slice(&entry.data);

        debug!(
            "stored {} ({} bytes, crc {:08x}) at offset {}",
            entry.name, size, checksum, lfh_offset
        );

        central.push(CentralDirectoryHeader {
            crc32: checksum,
            size,
            file_name_length,
            lfh_offset,
        });
    }

    let cd_start = out.len();
    let cd_offset = fit_u32("central directory offset", cd_start)?;

    for (header, entry) in central.iter().zip(entries) {
        header.write_to(&mut out)?;
        out.extend_from_slice(entry.name.as_bytes());
    }

    let cd_size = fit_u32("central directory size", out.len() - cd_start)?;

    EndOfCentralDirectory::new(total_entries, cd_size, cd_offset).write_to(&mut out)?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u16_at(buf: &[u8], at: usize) -> u16 {
        u16::from_le_bytes([buf[at], buf[at + 1]])
    }

    fn u32_at(buf: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
    }

    #[test]
    fn empty_archive_is_bare_eocd() {
        let zip = build_archive(&[]).unwrap();
        assert_eq!(
            zip,
            vec![
                0x50, 0x4b, 0x05, 0x06, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0
            ]
        );
    }

    #[test]
    fn single_entry_exact_bytes() {
        let zip = build_archive(&[ArchiveEntry::new("a", b"hi".to_vec())]).unwrap();

        // 30 + 1 + 2 local, 46 + 1 central, 22 eocd
        assert_eq!(zip.len(), 33 + 47 + 22);
        assert_eq!(&zip[30..33], b"ahi");

        let cd = 33;
        assert_eq!(u32_at(&zip, cd), 0x0201_4b50);
        assert_eq!(u32_at(&zip, cd + 42), 0);
        assert_eq!(zip[cd + 46], b'a');

        let eocd = cd + 47;
        assert_eq!(u16_at(&zip, eocd + 8), 1);
        assert_eq!(u16_at(&zip, eocd + 10), 1);
        assert_eq!(u32_at(&zip, eocd + 12), 47);
        assert_eq!(u32_at(&zip, eocd + 16), 33);
        assert_eq!(u16_at(&zip, eocd + 20), 0);
    }

    #[test]
    fn crc_written_to_both_headers() {
        let zip = build_archive(&[ArchiveEntry::new("n.txt", b"123456789".to_vec())]).unwrap();
        let cd = 30 + 5 + 9;
        assert_eq!(u32_at(&zip, 14), 0xCBF4_3926);
        assert_eq!(u32_at(&zip, cd + 16), 0xCBF4_3926);
    }

    #[test]
    fn second_offset_follows_first_record() {
        let entries = [
            ArchiveEntry::new("one", b"12345".to_vec()),
            ArchiveEntry::new("two", Vec::new()),
        ];
        let zip = build_archive(&entries).unwrap();
        let second = 30 + 3 + 5;
        assert_eq!(u32_at(&zip, second), 0x0403_4b50);

        let cd = second + 30 + 3;
        let second_cd = cd + 46 + 3;
        assert_eq!(u32_at(&zip, second_cd + 42), second as u32);
    }

    #[test]
    fn name_length_counts_bytes() {
        let name = "signatures/zoë björk.png";
        let zip = build_archive(&[ArchiveEntry::new(name, vec![1, 2, 3])]).unwrap();
        assert_eq!(u16_at(&zip, 26) as usize, name.len());
        assert!(name.len() > name.chars().count());
    }

    #[test]
    fn too_many_entries_is_rejected() {
        let entries = vec![ArchiveEntry::new("x", Vec::new()); 65_536];
        match build_archive(&entries) {
            Err(ArchiveError::TooLarge { field, value, limit }) => {
                assert_eq!(field, "entry count");
                assert_eq!(value, 65_536);
                assert_eq!(limit, 65_535);
            }
            other => panic!("expected TooLarge, got {:?}", other.map(|v| v.len())),
        }
    }

    #[test]
    fn overlong_name_is_rejected() {
        let entry = ArchiveEntry::new("n".repeat(70_000), Vec::new());
        let err = build_archive(&[entry]).unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::TooLarge {
                field: "file name length",
                ..
            }
        ));
    }

    #[test]
    fn max_entry_count_fits() {
        let entries = vec![ArchiveEntry::new("x", Vec::new()); 65_535];
        let zip = build_archive(&entries).unwrap();
        let eocd = zip.len() - 22;
        assert_eq!(u16_at(&zip, eocd + 10), 65_535);
    }
}
