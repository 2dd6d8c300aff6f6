//! Central directory parser.
//!
//! Reads the archive from the end: the EOCD gives the location of the
//! central directory, which is fetched in one read and decoded into
//! [`ZipFileEntry`] values. Entry data is located through each entry's
//! local header on demand.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};
use std::sync::Arc;

use crate::io::ReadAt;
use anyhow::{Context, Result, bail};
use log::debug;

use super::structures::*;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// Bounds the backwards search for an EOCD followed by a comment.
const MAX_COMMENT_SIZE: u64 = 65535;

/// Reads ZIP structures from any [`ReadAt`] source.
pub struct ZipParser<R: ReadAt> {
    reader: Arc<R>,
    size: u64,
}

impl<R: ReadAt> ZipParser<R> {
    pub fn new(reader: Arc<R>) -> Self {
        let size = reader.size();
        Self { reader, size }
    }

    /// Read exactly `buf.len()` bytes at `offset` or fail.
    async fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let n = self.reader.read_at(offset, buf).await?;
        if n < buf.len() {
            bail!(
                "Unexpected end of archive: wanted {} bytes at offset {}, got {}",
                buf.len(),
                offset,
                n
            );
        }
        Ok(())
    }

    /// Locate and decode the End of Central Directory record.
    ///
    /// Returns the record together with its offset in the archive.
    pub async fn find_eocd(&self) -> Result<(EndOfCentralDirectory, u64)> {
        let eocd_size = EndOfCentralDirectory::SIZE as u64;
        if self.size < eocd_size {
            bail!("Not a valid ZIP file");
        }

        // Common case: no archive comment, the EOCD is the last 22 bytes.
        let offset = self.size - eocd_size;
        let mut buf = vec![0u8; EndOfCentralDirectory::SIZE];
        self.read_exact_at(offset, &mut buf).await?;
        if let Ok(eocd) = EndOfCentralDirectory::from_bytes(&buf) {
            if eocd.comment_len == 0 {
                return Ok((eocd, offset));
            }
        }

        let search_size = (MAX_COMMENT_SIZE + eocd_size).min(self.size);
        let search_start = self.size - search_size;
        let mut buf = vec![0u8; search_size as usize];
        self.read_exact_at(search_start, &mut buf).await?;

        let signature = EndOfCentralDirectory::SIGNATURE.to_le_bytes();
        let last = buf.len() - EndOfCentralDirectory::SIZE;
        for i in (0..=last).rev() {
            if buf[i..i + 4] != signature {
                continue;
            }
            let eocd = EndOfCentralDirectory::from_bytes(&buf[i..])?;
            // The comment must run exactly to the end of the archive.
            if eocd.comment_len as usize == last - i {
                return Ok((eocd, search_start + i as u64));
            }
        }

        bail!("Not a valid ZIP file")
    }

    /// Whether a ZIP64 EOCD locator sits directly before the EOCD.
    ///
    /// Saturated EOCD fields alone are not enough: a classic archive may
    /// hold exactly 65535 entries.
    async fn has_zip64_locator(&self, eocd_offset: u64) -> Result<bool> {
        let locator_size = ZIP64_LOCATOR_SIZE as u64;
        if eocd_offset < locator_size {
            return Ok(false);
        }
        let mut buf = [0u8; 4];
        self.read_exact_at(eocd_offset - locator_size, &mut buf).await?;
        Ok(u32::from_le_bytes(buf) == ZIP64_LOCATOR_SIGNATURE)
    }

    /// List every entry recorded in the central directory.
    pub async fn list_files(&self) -> Result<Vec<ZipFileEntry>> {
        let (eocd, eocd_offset) = self.find_eocd().await?;

        if eocd.is_zip64() && self.has_zip64_locator(eocd_offset).await? {
            bail!("ZIP64 archives are not supported");
        }
        if eocd.disk_number != 0 || eocd.disk_with_cd != 0 {
            bail!("Multi-disk archives are not supported");
        }

        let cd_offset = eocd.cd_offset as u64;
        let cd_size = eocd.cd_size as u64;
        if cd_offset + cd_size > eocd_offset {
            bail!(
                "Central directory ({} bytes at {}) overlaps the EOCD at {}",
                cd_size,
                cd_offset,
                eocd_offset
            );
        }

        debug!(
            "central directory: {} entries, {} bytes at offset {}",
            eocd.total_entries, cd_size, cd_offset
        );

        let mut cd_data = vec![0u8; cd_size as usize];
        self.read_exact_at(cd_offset, &mut cd_data).await?;

        let mut entries = Vec::with_capacity(eocd.total_entries as usize);
        let mut cursor = Cursor::new(cd_data.as_slice());
        for index in 0..eocd.total_entries {
            let entry = parse_cdfh(&mut cursor)
                .with_context(|| format!("Central directory entry {}", index))?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Offset of the first data byte of `entry`.
    ///
    /// The local header's name and extra field may differ in length from
    /// the central directory copy, so the local header is read back.
    pub async fn data_offset(&self, entry: &ZipFileEntry) -> Result<u64> {
        let mut lfh = [0u8; LocalFileHeader::SIZE];
        self.read_exact_at(entry.lfh_offset, &mut lfh).await?;

        let mut cursor = Cursor::new(&lfh[..]);
        if cursor.read_u32::<LittleEndian>()? != LocalFileHeader::SIGNATURE {
            bail!("Invalid Local File Header for {}", entry.file_name);
        }

        cursor.set_position(LocalFileHeader::NAME_LENGTH_OFFSET);
        let file_name_length = cursor.read_u16::<LittleEndian>()? as u64;
        let extra_field_length = cursor.read_u16::<LittleEndian>()? as u64;

        Ok(entry.lfh_offset + LocalFileHeader::SIZE as u64 + file_name_length + extra_field_length)
    }

    pub fn reader(&self) -> &Arc<R> {
        &self.reader
    }
}

/// Decode one Central Directory File Header at the cursor position.
fn parse_cdfh(cursor: &mut Cursor<&[u8]>) -> Result<ZipFileEntry> {
    if cursor.read_u32::<LittleEndian>()? != CentralDirectoryHeader::SIGNATURE {
        bail!("Invalid Central Directory File Header");
    }

    let _version_made_by = cursor.read_u16::<LittleEndian>()?;
    let _version_needed = cursor.read_u16::<LittleEndian>()?;
    let _flags = cursor.read_u16::<LittleEndian>()?;
    let compression_method = cursor.read_u16::<LittleEndian>()?;
    let last_mod_time = cursor.read_u16::<LittleEndian>()?;
    let last_mod_date = cursor.read_u16::<LittleEndian>()?;
    let crc32 = cursor.read_u32::<LittleEndian>()?;
    let compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let uncompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let file_name_length = cursor.read_u16::<LittleEndian>()?;
    let extra_field_length = cursor.read_u16::<LittleEndian>()?;
    let file_comment_length = cursor.read_u16::<LittleEndian>()?;
    let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
    let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
    let _external_attrs = cursor.read_u32::<LittleEndian>()?;
    let lfh_offset = cursor.read_u32::<LittleEndian>()? as u64;

    let mut name = vec![0u8; file_name_length as usize];
    cursor.read_exact(&mut name)?;
    let file_name = String::from_utf8_lossy(&name).into_owned();

    let skip = extra_field_length as u64 + file_comment_length as u64;
    let end = cursor.position() + skip;
    if end > cursor.get_ref().len() as u64 {
        bail!("Truncated Central Directory File Header for {}", file_name);
    }
    cursor.set_position(end);

    Ok(ZipFileEntry {
        is_directory: file_name.ends_with('/'),
        file_name,
        compression_method: CompressionMethod::from_u16(compression_method),
        compressed_size,
        uncompressed_size,
        crc32,
        lfh_offset,
        last_mod_time,
        last_mod_date,
    })
}
