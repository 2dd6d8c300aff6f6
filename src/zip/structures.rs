use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Write};

use anyhow::{Result, bail};

/// Version needed to extract (and made by): 2.0, plain stored entries.
pub const VERSION: u16 = 20;

/// ZIP64 End of Central Directory Locator, found right before the EOCD.
pub const ZIP64_LOCATOR_SIGNATURE: u32 = 0x0706_4b50;
pub const ZIP64_LOCATOR_SIZE: usize = 20;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// Local File Header (LFH) - 30 bytes plus the name.
///
/// Only the fields that vary for stored entries are kept; flags, method and
/// timestamps are always written as zero.
#[derive(Debug, Clone, Copy)]
pub struct LocalFileHeader {
    pub crc32: u32,
    pub size: u32,
    pub file_name_length: u16,
}

impl LocalFileHeader {
    pub const SIGNATURE: u32 = 0x0403_4b50;
    pub const SIZE: usize = 30;

    /// Offset of the file name length field within the header.
    pub const NAME_LENGTH_OFFSET: u64 = 26;

    pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_u32::<LittleEndian>(Self::SIGNATURE)?;
        w.write_u16::<LittleEndian>(VERSION)?;
        w.write_u16::<LittleEndian>(0)?; // flags
        w.write_u16::<LittleEndian>(CompressionMethod::Stored.as_u16())?;
        w.write_u16::<LittleEndian>(0)?; // mod time
        w.write_u16::<LittleEndian>(0)?; // mod date
        w.write_u32::<LittleEndian>(self.crc32)?;
        w.write_u32::<LittleEndian>(self.size)?; // compressed
        w.write_u32::<LittleEndian>(self.size)?; // uncompressed
        w.write_u16::<LittleEndian>(self.file_name_length)?;
        w.write_u16::<LittleEndian>(0)?; // extra field length
        Ok(())
    }
}

/// Central Directory File Header (CDFH) - 46 bytes plus the name.
#[derive(Debug, Clone, Copy)]
pub struct CentralDirectoryHeader {
    pub crc32: u32,
    pub size: u32,
    pub file_name_length: u16,
    pub lfh_offset: u32,
}

impl CentralDirectoryHeader {
    pub const SIGNATURE: u32 = 0x0201_4b50;
    pub const SIZE: usize = 46;

    pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_u32::<LittleEndian>(Self::SIGNATURE)?;
        w.write_u16::<LittleEndian>(VERSION)?; // made by
        w.write_u16::<LittleEndian>(VERSION)?; // needed
        w.write_u16::<LittleEndian>(0)?; // flags
        w.write_u16::<LittleEndian>(CompressionMethod::Stored.as_u16())?;
        w.write_u16::<LittleEndian>(0)?; // mod time
        w.write_u16::<LittleEndian>(0)?; // mod date
        w.write_u32::<LittleEndian>(self.crc32)?;
        w.write_u32::<LittleEndian>(self.size)?;
        w.write_u32::<LittleEndian>(self.size)?;
        w.write_u16::<LittleEndian>(self.file_name_length)?;
        w.write_u16::<LittleEndian>(0)?; // extra field length
        w.write_u16::<LittleEndian>(0)?; // comment length
        w.write_u16::<LittleEndian>(0)?; // disk number start
        w.write_u16::<LittleEndian>(0)?; // internal attributes
        w.write_u32::<LittleEndian>(0)?; // external attributes
        w.write_u32::<LittleEndian>(self.lfh_offset)?;
        Ok(())
    }
}

/// End of Central Directory (EOCD) - 22 bytes minimum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: u32 = 0x0605_4b50;
    pub const SIZE: usize = 22;

    /// EOCD for a single-disk archive without a comment.
    pub fn new(entries: u16, cd_size: u32, cd_offset: u32) -> Self {
        Self {
            disk_number: 0,
            disk_with_cd: 0,
            disk_entries: entries,
            total_entries: entries,
            cd_size,
            cd_offset,
            comment_len: 0,
        }
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            bail!("Invalid End of Central Directory");
        }

        let mut cursor = Cursor::new(data);
        if cursor.read_u32::<LittleEndian>()? != Self::SIGNATURE {
            bail!("Invalid End of Central Directory");
        }

        Ok(Self {
            disk_number: cursor.read_u16::<LittleEndian>()?,
            disk_with_cd: cursor.read_u16::<LittleEndian>()?,
            disk_entries: cursor.read_u16::<LittleEndian>()?,
            total_entries: cursor.read_u16::<LittleEndian>()?,
            cd_size: cursor.read_u32::<LittleEndian>()?,
            cd_offset: cursor.read_u32::<LittleEndian>()?,
            comment_len: cursor.read_u16::<LittleEndian>()?,
        })
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_u32::<LittleEndian>(Self::SIGNATURE)?;
        w.write_u16::<LittleEndian>(self.disk_number)?;
        w.write_u16::<LittleEndian>(self.disk_with_cd)?;
        w.write_u16::<LittleEndian>(self.disk_entries)?;
        w.write_u16::<LittleEndian>(self.total_entries)?;
        w.write_u32::<LittleEndian>(self.cd_size)?;
        w.write_u32::<LittleEndian>(self.cd_offset)?;
        w.write_u16::<LittleEndian>(self.comment_len)?;
        Ok(())
    }

    /// Saturated fields may mean the real values live in a ZIP64 record;
    /// a locator before the EOCD confirms it.
    pub fn is_zip64(&self) -> bool {
        self.disk_entries == 0xFFFF
            || self.total_entries == 0xFFFF
            || self.cd_size == 0xFFFFFFFF
            || self.cd_offset == 0xFFFFFFFF
    }
}

/// Parsed ZIP file entry information
#[derive(Debug, Clone)]
pub struct ZipFileEntry {
    pub file_name: String,
    pub compression_method: CompressionMethod,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub crc32: u32,
    pub lfh_offset: u64,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub is_directory: bool,
}

impl ZipFileEntry {
    /// Parse modification date to (year, month, day)
    pub fn mod_date(&self) -> (u16, u8, u8) {
        let day = (self.last_mod_date & 0x1F) as u8;
        let month = ((self.last_mod_date >> 5) & 0x0F) as u8;
        let year = ((self.last_mod_date >> 9) & 0x7F) + 1980;
        (year, month, day)
    }

    /// Parse modification time to (hour, minute, second)
    pub fn mod_time(&self) -> (u8, u8, u8) {
        let second = ((self.last_mod_time & 0x1F) * 2) as u8;
        let minute = ((self.last_mod_time >> 5) & 0x3F) as u8;
        let hour = ((self.last_mod_time >> 11) & 0x1F) as u8;
        (hour, minute, second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_header_layout() {
        let header = LocalFileHeader {
            crc32: 0xCBF4_3926,
            size: 9,
            file_name_length: 5,
        };
        let mut buf = Vec::new();
        header.write_to(&mut buf).unwrap();

        assert_eq!(buf.len(), LocalFileHeader::SIZE);
        assert_eq!(&buf[0..4], b"PK\x03\x04");
        assert_eq!(&buf[4..6], &[20, 0]);
        assert_eq!(&buf[8..10], &[0, 0]);
        assert_eq!(&buf[14..18], &0xCBF4_3926u32.to_le_bytes());
        assert_eq!(&buf[18..22], &9u32.to_le_bytes());
        assert_eq!(&buf[22..26], &9u32.to_le_bytes());
        assert_eq!(&buf[26..28], &[5, 0]);
        assert_eq!(&buf[28..30], &[0, 0]);
    }

    #[test]
    fn central_header_layout() {
        let header = CentralDirectoryHeader {
            crc32: 1,
            size: 2,
            file_name_length: 3,
            lfh_offset: 0x0102_0304,
        };
        let mut buf = Vec::new();
        header.write_to(&mut buf).unwrap();

        assert_eq!(buf.len(), CentralDirectoryHeader::SIZE);
        assert_eq!(&buf[0..4], b"PK\x01\x02");
        assert_eq!(&buf[4..8], &[20, 0, 20, 0]);
        assert_eq!(&buf[28..30], &[3, 0]);
        assert_eq!(&buf[42..46], &[4, 3, 2, 1]);
    }

    #[test]
    fn eocd_encode_decode() {
        let eocd = EndOfCentralDirectory::new(3, 150, 1024);
        let mut buf = Vec::new();
        eocd.write_to(&mut buf).unwrap();

        assert_eq!(buf.len(), EndOfCentralDirectory::SIZE);
        assert_eq!(&buf[0..4], b"PK\x05\x06");
        assert_eq!(EndOfCentralDirectory::from_bytes(&buf).unwrap(), eocd);
        assert!(!eocd.is_zip64());
    }

    #[test]
    fn eocd_rejects_bad_input() {
        assert!(EndOfCentralDirectory::from_bytes(&[0u8; 10]).is_err());
        assert!(EndOfCentralDirectory::from_bytes(&[0u8; 22]).is_err());
    }

    #[test]
    fn dos_timestamp_decoding() {
        let entry = ZipFileEntry {
            file_name: "a.txt".to_string(),
            compression_method: CompressionMethod::Stored,
            compressed_size: 0,
            uncompressed_size: 0,
            crc32: 0,
            lfh_offset: 0,
            // 14:30:10
            last_mod_time: (14 << 11) | (30 << 5) | 5,
            // 2024-03-15
            last_mod_date: (44 << 9) | (3 << 5) | 15,
            is_directory: false,
        };
        assert_eq!(entry.mod_date(), (2024, 3, 15));
        assert_eq!(entry.mod_time(), (14, 30, 10));
    }
}
