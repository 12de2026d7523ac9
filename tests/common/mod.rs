//! Common test utilities: a minimal single-title VIDEO_TS folder

#![allow(dead_code)]

use discforged_media::dvd::ifo::{VMG_IDENTIFIER, VTS_IDENTIFIER};
use discforged_media::SECTOR_SIZE;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Seconds of playback per cell.
pub const CELL_SECS: u32 = 60;

/// Build a disc with one title whose cells cover `cells` inclusive sector
/// ranges, one chapter per cell. Each VOB sector starts with its
/// big-endian sector number.
pub fn single_title_disc(cells: &[(u32, u32)]) -> TempDir {
    let dir = tempfile::Builder::new()
        .prefix("MOVIE")
        .tempdir()
        .unwrap();
    let video_ts = dir.path().join("VIDEO_TS");
    fs::create_dir(&video_ts).unwrap();

    fs::write(video_ts.join("VIDEO_TS.IFO"), vmg(cells.len() as u16)).unwrap();
    fs::write(video_ts.join("VTS_01_0.IFO"), vts(cells)).unwrap();
    let sectors = cells.iter().map(|&(_, last)| last + 1).max().unwrap_or(0);
    write_vob(&video_ts, sectors);
    dir
}

pub fn sector_tags(data: &[u8]) -> Vec<u32> {
    data.chunks(SECTOR_SIZE)
        .map(|s| u32::from_be_bytes([s[0], s[1], s[2], s[3]]))
        .collect()
}

fn vmg(ptts: u16) -> Vec<u8> {
    let mut buf = vec![0u8; 2 * SECTOR_SIZE];
    buf[..12].copy_from_slice(VMG_IDENTIFIER);
    put_u16(&mut buf, 0x3E, 1);
    put_u32(&mut buf, 0xC4, 1);

    let base = SECTOR_SIZE;
    put_u16(&mut buf, base, 1);
    put_u32(&mut buf, base + 4, 8 + 12 - 1);
    buf[base + 8] = 0x3c;
    buf[base + 9] = 1;
    put_u16(&mut buf, base + 10, ptts);
    buf[base + 14] = 1;
    buf[base + 15] = 1;
    buf
}

fn vts(cells: &[(u32, u32)]) -> Vec<u8> {
    let mut buf = vec![0u8; 3 * SECTOR_SIZE];
    buf[..12].copy_from_slice(VTS_IDENTIFIER);
    put_u32(&mut buf, 0xC8, 1);
    put_u32(&mut buf, 0xCC, 2);

    // PTT_SRPT: one VTS title, one part per program
    let ptt = SECTOR_SIZE;
    put_u16(&mut buf, ptt, 1);
    put_u32(&mut buf, ptt + 4, (12 + 4 * cells.len() - 1) as u32);
    put_u32(&mut buf, ptt + 8, 12);
    for i in 0..cells.len() {
        put_u16(&mut buf, ptt + 12 + 4 * i, 1);
        put_u16(&mut buf, ptt + 14 + 4 * i, i as u16 + 1);
    }

    // PGCIT: one PGC at offset 16
    let pgcit = 2 * SECTOR_SIZE;
    let program_map = 0xEC;
    let cell_offset = program_map + cells.len().next_multiple_of(2);
    let pgc_len = cell_offset + 24 * cells.len();
    put_u16(&mut buf, pgcit, 1);
    put_u32(&mut buf, pgcit + 4, (16 + pgc_len - 1) as u32);
    buf[pgcit + 8] = 0x81;
    put_u32(&mut buf, pgcit + 12, 16);

    let pgc = pgcit + 16;
    buf[pgc + 2] = cells.len() as u8;
    buf[pgc + 3] = cells.len() as u8;
    buf[pgc + 4..pgc + 8].copy_from_slice(&bcd_time(CELL_SECS * cells.len() as u32));
    put_u16(&mut buf, pgc + 0xE6, program_map as u16);
    put_u16(&mut buf, pgc + 0xE8, cell_offset as u16);
    for (i, &(first, last)) in cells.iter().enumerate() {
        buf[pgc + program_map + i] = i as u8 + 1;
        let c = pgc + cell_offset + 24 * i;
        buf[c + 4..c + 8].copy_from_slice(&bcd_time(CELL_SECS));
        put_u32(&mut buf, c + 8, first);
        put_u32(&mut buf, c + 20, last);
    }
    buf
}

fn write_vob(dir: &Path, sectors: u32) {
    let mut data = Vec::with_capacity(sectors as usize * SECTOR_SIZE);
    for s in 0..sectors {
        let mut block = vec![0u8; SECTOR_SIZE];
        block[..4].copy_from_slice(&s.to_be_bytes());
        data.extend_from_slice(&block);
    }
    fs::write(dir.join("VTS_01_1.VOB"), data).unwrap();
}

/// BCD h:m:s at 25 fps.
fn bcd_time(secs: u32) -> [u8; 4] {
    fn bcd(v: u32) -> u8 {
        ((v / 10) << 4 | (v % 10)) as u8
    }
    [bcd(secs / 3600), bcd(secs % 3600 / 60), bcd(secs % 60), 0x40]
}

fn put_u16(buf: &mut [u8], off: usize, v: u16) {
    buf[off..off + 2].copy_from_slice(&v.to_be_bytes());
}

fn put_u32(buf: &mut [u8], off: usize, v: u32) {
    buf[off..off + 4].copy_from_slice(&v.to_be_bytes());
}
