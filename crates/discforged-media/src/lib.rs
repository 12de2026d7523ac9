//! Discforged-Media: optical-disc navigation and linear sector streams
//!
//! This crate turns the program structure of a DVD-Video or Blu-ray disc into
//! one deterministic, seekable byte stream that a transport-stream or VOB
//! demuxer can consume.
//!
//! # Modules
//!
//! - `sector` - Fixed-size sector reads over a random-access byte store
//! - `catalog` - Title enumeration and the "main or longest" heuristic
//! - `dvd` - IFO parsing, angle-aware cell traversal, the DVD title stream
//! - `bluray` - Title selection and stream bridging over a Blu-ray library
//! - `demux` - Seam to an external MPEG transport-stream demuxer
//! - `location` - Disc location parsing and format probing
//! - `time` - 90 kHz / BCD time representations and rescaling
//!
//! # Architecture
//!
//! A DVD title is opened in a fixed sequence:
//!
//! 1. Scan every title set once and build the title catalog
//! 2. Select the explicit title, or the longest one
//! 3. Resolve the program chain and entry cell, substituting the angle
//! 4. Walk cells in playback order, one unit at a time, never reading
//!    across a cell boundary in a single call
//!
//! Everything read from the disc index is held read-only for the life of
//! the stream; only the cursor position changes.

pub mod bluray;
pub mod catalog;
pub mod demux;
pub mod dvd;
pub mod error;
pub mod location;
pub mod sector;
pub mod time;

pub use catalog::{Chapter, TieBreak, Title, TitleCatalog, TitleRef};
pub use demux::{ByteStream, TransportDemuxer};
pub use dvd::{DvdDisc, DvdOptions, DvdTitleStream, VideoTsFolder};
pub use error::{Error, Result};
pub use location::{probe_score, DiscFormat, DiscLocation};
pub use sector::{ByteStoreSource, SectorSource, SECTOR_SIZE};
pub use time::Rational;
