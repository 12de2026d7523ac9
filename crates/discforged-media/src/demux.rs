//! Seam to an external MPEG transport-stream demuxer.
//!
//! The core never parses the TS/PES layer. A [`TransportDemuxer`] is handed
//! a [`ByteStream`] and reports programs, elementary streams and packets.

use crate::time::Rational;
use crate::Result;
use bytes::Bytes;
use std::io::{Read, Seek};

/// A readable, seekable byte stream with an optional known size.
pub trait ByteStream: Read + Seek {
    /// Total length in bytes, `None` when the medium cannot tell.
    fn size(&mut self) -> Option<u64>;
}

/// Demultiplexes an MPEG transport stream.
pub trait TransportDemuxer {
    /// Take ownership of `input` and read the program tables.
    fn open(&mut self, input: Box<dyn ByteStream>) -> Result<ProgramTables>;

    /// Next packet, or `None` at end of stream.
    fn read_packet(&mut self) -> Result<Option<Packet>>;
}

/// Programs and elementary streams found by the demuxer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramTables {
    pub programs: Vec<Program>,
    pub streams: Vec<ElementaryStream>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Program {
    pub id: u32,
    pub program_num: u32,
    /// Indexes into the stream list.
    pub stream_indexes: Vec<usize>,
    pub start_time: Option<i64>,
}

/// Stream category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "lowercase"))]
pub enum MediaKind {
    Video,
    Audio,
    Subtitle,
    #[default]
    Data,
}

/// Codec description carried through unchanged from the demuxer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodecParameters {
    pub kind: MediaKind,
    /// Codec identifier (e.g., "h264", "ac3", "hdmv_pgs_subtitle")
    pub codec: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub channels: Option<u8>,
    pub sample_rate: Option<u32>,
    pub bit_rate: Option<u64>,
    /// Codec private data.
    pub extradata: Bytes,
}

/// One elementary stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementaryStream {
    pub index: usize,
    /// Stream id; the transport PID for MPEG-TS.
    pub id: u32,
    pub codec: CodecParameters,
    pub time_base: Rational,
    pub start_time: Option<i64>,
    /// ISO 639-2 language code.
    pub language: Option<String>,
}

/// A demuxed packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub stream_index: usize,
    pub pts: Option<i64>,
    pub dts: Option<i64>,
    pub keyframe: bool,
    pub data: Bytes,
}
