//! Blu-ray title as a byte stream.

use super::BlurayDisc;
use crate::demux::ByteStream;
use crate::Error;
use std::io::{self, Read, Seek, SeekFrom};

/// Byte stream over the selected title of a [`BlurayDisc`].
///
/// Clips are concatenated by the disc library, so reads and seeks are
/// delegated without any unit bookkeeping.
pub struct BlurayStream<B> {
    disc: B,
}

impl<B: BlurayDisc> BlurayStream<B> {
    pub fn new(disc: B) -> Self {
        Self { disc }
    }

    pub fn disc(&self) -> &B {
        &self.disc
    }

    pub fn into_inner(self) -> B {
        self.disc
    }
}

impl<B: BlurayDisc> Read for BlurayStream<B> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.disc.read(buf)?)
    }
}

impl<B: BlurayDisc> Seek for BlurayStream<B> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(p) => Some(p),
            SeekFrom::Current(d) => self.disc.tell().checked_add_signed(d),
            SeekFrom::End(d) => {
                let size = self
                    .disc
                    .title_size()
                    .ok_or_else(|| Error::unsupported("seek from end: title size unknown"))?;
                size.checked_add_signed(d)
            }
        }
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "seek before start of title"))?;

        Ok(self.disc.seek(target)?)
    }
}

impl<B: BlurayDisc> ByteStream for BlurayStream<B> {
    fn size(&mut self) -> Option<u64> {
        self.disc.title_size()
    }
}
