use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::io::ReadAt;
use anyhow::{Result, bail};
use log::warn;

use super::crc32::crc32;
use super::parser::ZipParser;
use super::structures::{CompressionMethod, ZipFileEntry};

/// Outcome of checking one entry's data against its stored CRC-32.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryCheck {
    pub file_name: String,
    pub size: u64,
    pub expected_crc: u32,
    pub actual_crc: u32,
}

impl EntryCheck {
    pub fn is_ok(&self) -> bool {
        self.expected_crc == self.actual_crc
    }
}

/// Reads entries back out of a stored ZIP archive.
pub struct ZipExtractor<R: ReadAt> {
    parser: ZipParser<R>,
}

impl<R: ReadAt> ZipExtractor<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self {
            parser: ZipParser::new(reader),
        }
    }

    /// List all files in the archive
    pub async fn list_files(&self) -> Result<Vec<ZipFileEntry>> {
        self.parser.list_files().await
    }

    /// Extract file data to memory
    pub async fn extract_to_memory(&self, entry: &ZipFileEntry) -> Result<Vec<u8>> {
        if entry.compression_method != CompressionMethod::Stored {
            bail!(
                "Unsupported compression method {} for {} (only STORED is supported)",
                entry.compression_method.as_u16(),
                entry.file_name
            );
        }
        if entry.compressed_size != entry.uncompressed_size {
            bail!(
                "Size mismatch for stored entry {}: {} compressed, {} uncompressed",
                entry.file_name,
                entry.compressed_size,
                entry.uncompressed_size
            );
        }

        let data_offset = self.parser.data_offset(entry).await?;
        let archive_size = self.parser.reader().size();
        if data_offset
            .checked_add(entry.uncompressed_size)
            .is_none_or(|end| end > archive_size)
        {
            bail!(
                "Entry {} claims {} bytes at offset {}, past the end of the archive",
                entry.file_name,
                entry.uncompressed_size,
                data_offset
            );
        }

        let mut buf = vec![0u8; entry.uncompressed_size as usize];
        let n = self.parser.reader().read_at(data_offset, &mut buf).await?;
        if n < buf.len() {
            bail!("Truncated data for {}", entry.file_name);
        }

        Ok(buf)
    }

    /// Extract file to disk, creating parent directories.
    pub async fn extract_to_file(&self, entry: &ZipFileEntry, output_path: &Path) -> Result<()> {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let data = self.extract_to_memory(entry).await?;

        let mut file = fs::File::create(output_path).await?;
        file.write_all(&data).await?;
        file.flush().await?;

        Ok(())
    }

    /// Recompute the CRC-32 of every file entry.
    ///
    /// Directory entries are skipped. Structural errors abort the test;
    /// checksum mismatches are reported per entry.
    pub async fn test_archive(&self) -> Result<Vec<EntryCheck>> {
        let entries = self.list_files().await?;
        let mut checks = Vec::with_capacity(entries.len());

        for entry in entries.iter().filter(|e| !e.is_directory) {
            let data = self.extract_to_memory(entry).await?;
            let check = EntryCheck {
                file_name: entry.file_name.clone(),
                size: entry.uncompressed_size,
                expected_crc: entry.crc32,
                actual_crc: crc32(&data),
            };
            if !check.is_ok() {
                warn!(
                    "bad CRC {:08x} (should be {:08x}) for {}",
                    check.actual_crc, check.expected_crc, check.file_name
                );
            }
            checks.push(check);
        }

        Ok(checks)
    }
}
