mod local;
mod memory;

pub use local::LocalFileReader;
pub use memory::MemoryReader;

use anyhow::Result;
use async_trait::async_trait;

/// Random access reads from an archive source
#[async_trait]
pub trait ReadAt: Send + Sync {
    /// Read up to `buf.len()` bytes at `offset`, returning how many were read.
    ///
    /// Fewer bytes than requested means the source ended.
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;
}
