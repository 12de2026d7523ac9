//! Common test utilities: synthetic VIDEO_TS folders

#![allow(dead_code)]

pub mod builder;
pub use builder::{CellSpec, PgcSpec, TitleSetSpec, VideoTsBuilder};

use discforged_media::SECTOR_SIZE;

/// Sector number stamped at the start of every VOB sector by the builder.
pub fn sector_tag(sector: &[u8]) -> u32 {
    u32::from_be_bytes([sector[0], sector[1], sector[2], sector[3]])
}

/// Sector tags of a linear stream, in order.
pub fn sector_tags(data: &[u8]) -> Vec<u32> {
    data.chunks(SECTOR_SIZE).map(sector_tag).collect()
}

/// Encode seconds as a BCD DVD playback time at 25 fps.
pub fn bcd_time(secs: u32) -> [u8; 4] {
    fn bcd(v: u32) -> u8 {
        ((v / 10) << 4 | (v % 10)) as u8
    }
    [bcd(secs / 3600), bcd(secs % 3600 / 60), bcd(secs % 60), 0x40]
}
