//! Blu-ray playlist selection and transport-stream bridging.
//!
//! Playlist parsing, clip concatenation and decryption belong to the disc
//! library behind [`BlurayDisc`]. This module picks a title, exposes the
//! library's title stream as a [`ByteStream`](crate::demux::ByteStream)
//! and tags the demuxed elementary streams with clip languages.

mod demux;
mod stream;

pub use demux::{BlurayDemuxer, BlurayOptions, MIN_TITLE_LENGTH};
pub use stream::BlurayStream;

use crate::Result;
use std::collections::HashMap;

/// Read access to an opened Blu-ray disc, mirroring the subset of a disc
/// library this crate consumes.
pub trait BlurayDisc {
    fn disc_info(&mut self) -> Result<DiscInfo>;

    /// Number of relevant titles at least `min_title_length` seconds long.
    /// Titles are then addressed by index `0..count`.
    fn title_count(&mut self, min_title_length: u32) -> Result<u32>;

    fn title_info(&mut self, title: u32) -> Result<TitleInfo>;

    /// Select the title (and its playlist) for reading.
    fn select_title(&mut self, title: u32) -> Result<()>;

    /// Read from the selected title. 0 is end of title.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Seek to an absolute byte position; returns the position reached.
    fn seek(&mut self, pos: u64) -> Result<u64>;

    /// Current byte position.
    fn tell(&mut self) -> u64;

    /// Byte length of the selected title, if known.
    fn title_size(&mut self) -> Option<u64> {
        None
    }
}

/// General disc information.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscInfo {
    pub name: Option<String>,
    /// Title the disc declares as its main feature.
    pub main_title: Option<u32>,
}

/// One title as reported by the disc library.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleInfo {
    pub index: u32,
    /// Playlist number (`NNNNN.mpls`).
    pub playlist: u32,
    /// Duration in 90 kHz ticks.
    pub duration: u64,
    pub angle_count: u32,
    pub chapters: Vec<ChapterInfo>,
    pub clips: Vec<ClipInfo>,
}

/// A chapter mark, in 90 kHz ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChapterInfo {
    pub index: u32,
    pub start: u64,
    pub duration: u64,
}

/// Stream descriptors of one clip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipInfo {
    pub audio_streams: Vec<StreamInfo>,
    pub sec_audio_streams: Vec<StreamInfo>,
    /// Presentation graphics (subtitle) streams.
    pub pg_streams: Vec<StreamInfo>,
}

/// One stream descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamInfo {
    pub pid: u16,
    pub coding_type: u8,
    /// ISO 639-2 language code.
    pub lang: String,
}

impl ClipInfo {
    /// Map each pid to its language: audio, then secondary audio, then
    /// subtitle descriptors. The first descriptor for a pid wins.
    pub fn language_map(&self) -> HashMap<u16, String> {
        let mut map = HashMap::new();
        for info in self
            .audio_streams
            .iter()
            .chain(&self.sec_audio_streams)
            .chain(&self.pg_streams)
        {
            map.entry(info.pid).or_insert_with(|| info.lang.clone());
        }
        map
    }
}
