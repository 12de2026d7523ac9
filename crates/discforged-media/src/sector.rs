//! Fixed-size sector access over a random-access byte store.

use crate::Result;
use std::io::{ErrorKind, Read, Seek, SeekFrom};

/// Logical sector size shared by DVD and Blu-ray.
pub const SECTOR_SIZE: usize = 2048;

/// Byte offset of a logical block address.
pub fn lba_to_bytes(lba: u32) -> u64 {
    lba as u64 * SECTOR_SIZE as u64
}

/// Reads whole sectors by logical block address.
///
/// I/O errors are surfaced unchanged: no retries, no silent truncation.
pub trait SectorSource {
    /// Read up to `count` sectors starting at `lba` into `buf`.
    ///
    /// `buf` must hold at least `count * SECTOR_SIZE` bytes. Returns the
    /// number of whole sectors read, which is fewer than `count` on a
    /// short read and 0 past the end of the store.
    fn read_blocks(&mut self, lba: u32, count: u32, buf: &mut [u8]) -> Result<u32>;

    /// Total size in bytes, if the store knows it.
    fn size(&mut self) -> Option<u64> {
        None
    }
}

impl<S: SectorSource + ?Sized> SectorSource for Box<S> {
    fn read_blocks(&mut self, lba: u32, count: u32, buf: &mut [u8]) -> Result<u32> {
        (**self).read_blocks(lba, count, buf)
    }

    fn size(&mut self) -> Option<u64> {
        (**self).size()
    }
}

/// [`SectorSource`] over any `Read + Seek` byte store.
pub struct ByteStoreSource<R> {
    inner: R,
}

impl<R: Read + Seek> ByteStoreSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Unwrap the byte store.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> SectorSource for ByteStoreSource<R> {
    fn read_blocks(&mut self, lba: u32, count: u32, buf: &mut [u8]) -> Result<u32> {
        let offset = lba_to_bytes(lba);
        let wanted = (count as usize * SECTOR_SIZE).min(buf.len());

        if let Err(e) = self.inner.seek(SeekFrom::Start(offset)) {
            tracing::error!(offset, error = %e, "failed to seek sector store");
            return Err(e.into());
        }

        // Fill as much as the store gives us; a sector store may return
        // partial reads near file boundaries.
        let mut filled = 0;
        while filled < wanted {
            match self.inner.read(&mut buf[filled..wanted]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::error!(
                        bytes = wanted,
                        offset,
                        error = %e,
                        "failed to read from sector store"
                    );
                    return Err(e.into());
                }
            }
        }

        Ok((filled / SECTOR_SIZE) as u32)
    }

    fn size(&mut self) -> Option<u64> {
        let pos = self.inner.stream_position().ok()?;
        let end = self.inner.seek(SeekFrom::End(0)).ok()?;
        self.inner.seek(SeekFrom::Start(pos)).ok()?;
        Some(end)
    }
}
