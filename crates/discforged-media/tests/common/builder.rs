use super::bcd_time;
use discforged_media::dvd::ifo::{VMG_IDENTIFIER, VTS_IDENTIFIER};
use discforged_media::dvd::CellBlock;
use discforged_media::SECTOR_SIZE;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[derive(Debug, Clone)]
pub struct CellSpec {
    pub first: u32,
    pub last: u32,
    pub block: CellBlock,
    pub secs: u32,
}

impl CellSpec {
    pub fn normal(first: u32, last: u32, secs: u32) -> Self {
        Self {
            first,
            last,
            block: CellBlock::Normal,
            secs,
        }
    }

    pub fn angle(first: u32, last: u32, secs: u32, is_last: bool) -> Self {
        Self {
            first,
            last,
            block: if is_last {
                CellBlock::AngleLast
            } else {
                CellBlock::AngleMember
            },
            secs,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgcSpec {
    pub secs: u32,
    /// 1-based entry cell per program
    pub program_map: Vec<u8>,
    pub cells: Vec<CellSpec>,
}

#[derive(Debug, Clone)]
pub struct TitleSetSpec {
    pub pgcs: Vec<PgcSpec>,
    /// Per VTS title: (pgcn, pgn) chapter entries
    pub parts: Vec<Vec<(u16, u16)>>,
    pub vob_sectors: u32,
    /// Split the VOB data into parts of this many sectors
    pub vob_part_sectors: u32,
    pub omit_pgcit: bool,
}

impl TitleSetSpec {
    pub fn new(vob_sectors: u32) -> Self {
        Self {
            pgcs: Vec::new(),
            parts: Vec::new(),
            vob_sectors,
            vob_part_sectors: u32::MAX,
            omit_pgcit: false,
        }
    }

    /// Add a PGC played by its own VTS title, one chapter per program.
    pub fn title(mut self, pgc: PgcSpec) -> Self {
        let pgcn = self.pgcs.len() as u16 + 1;
        let parts = (1..=pgc.program_map.len() as u16).map(|pgn| (pgcn, pgn)).collect();
        self.pgcs.push(pgc);
        self.parts.push(parts);
        self
    }
}

#[derive(Debug, Clone)]
struct TitleSpec {
    title_set: u8,
    vts_ttn: u8,
    angles: u8,
    ptts: u16,
}

#[derive(Default)]
pub struct VideoTsBuilder {
    titles: Vec<TitleSpec>,
    title_sets: Vec<TitleSetSpec>,
}

impl VideoTsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a title set; every VTS title in it becomes a disc title.
    pub fn title_set(mut self, spec: TitleSetSpec) -> Self {
        let ts = self.title_sets.len() as u8 + 1;
        for (i, parts) in spec.parts.iter().enumerate() {
            let angles = spec.pgcs[i]
                .cells
                .iter()
                .filter(|c| c.block.is_angle())
                .count()
                .max(1);
            let blocks = spec.pgcs[i]
                .cells
                .iter()
                .filter(|c| c.block == CellBlock::AngleLast)
                .count()
                .max(1);
            self.titles.push(TitleSpec {
                title_set: ts,
                vts_ttn: i as u8 + 1,
                angles: (angles / blocks) as u8,
                ptts: parts.len() as u16,
            });
        }
        self.title_sets.push(spec);
        self
    }

    /// Add a disc title pointing at an arbitrary title set and VTS title.
    pub fn raw_title(mut self, title_set: u8, vts_ttn: u8) -> Self {
        self.titles.push(TitleSpec {
            title_set,
            vts_ttn,
            angles: 1,
            ptts: 1,
        });
        self
    }

    /// Write the disc into a temporary directory; the disc root is returned.
    pub fn build(self) -> TempDir {
        let dir = tempfile::Builder::new()
            .prefix("DISC")
            .tempdir()
            .unwrap();
        let video_ts = dir.path().join("VIDEO_TS");
        fs::create_dir(&video_ts).unwrap();

        fs::write(video_ts.join("VIDEO_TS.IFO"), self.vmg()).unwrap();
        for (i, ts) in self.title_sets.iter().enumerate() {
            let n = i + 1;
            fs::write(video_ts.join(format!("VTS_{n:02}_0.IFO")), vts(ts)).unwrap();
            write_vobs(&video_ts, n, ts);
        }
        dir
    }

    fn vmg(&self) -> Vec<u8> {
        let mut buf = vec![0u8; 2 * SECTOR_SIZE];
        buf[..12].copy_from_slice(VMG_IDENTIFIER);
        put_u16(&mut buf, 0x3E, self.title_sets.len() as u16);
        put_u32(&mut buf, 0xC4, 1);

        let base = SECTOR_SIZE;
        put_u16(&mut buf, base, self.titles.len() as u16);
        put_u32(&mut buf, base + 4, (8 + 12 * self.titles.len() - 1) as u32);
        for (i, t) in self.titles.iter().enumerate() {
            let off = base + 8 + i * 12;
            buf[off] = 0x3c;
            buf[off + 1] = t.angles;
            put_u16(&mut buf, off + 2, t.ptts);
            buf[off + 6] = t.title_set;
            buf[off + 7] = t.vts_ttn;
        }
        buf
    }
}

fn vts(spec: &TitleSetSpec) -> Vec<u8> {
    let ptt_srpt = ptt_srpt(&spec.parts);
    let pgcit = pgcit(&spec.pgcs);

    let ptt_sector = 1;
    let pgcit_sector = ptt_sector + sectors_for(ptt_srpt.len());
    let total = pgcit_sector + sectors_for(pgcit.len());

    let mut buf = vec![0u8; total * SECTOR_SIZE];
    buf[..12].copy_from_slice(VTS_IDENTIFIER);
    put_u32(&mut buf, 0xC8, ptt_sector as u32);
    if !spec.omit_pgcit {
        put_u32(&mut buf, 0xCC, pgcit_sector as u32);
    }

    let at = ptt_sector * SECTOR_SIZE;
    buf[at..at + ptt_srpt.len()].copy_from_slice(&ptt_srpt);
    let at = pgcit_sector * SECTOR_SIZE;
    buf[at..at + pgcit.len()].copy_from_slice(&pgcit);
    buf
}

fn ptt_srpt(parts: &[Vec<(u16, u16)>]) -> Vec<u8> {
    let header = 8 + 4 * parts.len();
    let entries: usize = parts.iter().map(|p| p.len() * 4).sum();
    let mut buf = vec![0u8; header + entries];
    put_u16(&mut buf, 0, parts.len() as u16);
    put_u32(&mut buf, 4, (header + entries - 1) as u32);

    let mut offset = header;
    for (i, ptts) in parts.iter().enumerate() {
        put_u32(&mut buf, 8 + 4 * i, offset as u32);
        for &(pgcn, pgn) in ptts {
            put_u16(&mut buf, offset, pgcn);
            put_u16(&mut buf, offset + 2, pgn);
            offset += 4;
        }
    }
    buf
}

const PGC_PROGRAM_MAP: usize = 0xEC;

fn pgc(spec: &PgcSpec) -> Vec<u8> {
    let cell_offset = PGC_PROGRAM_MAP + spec.program_map.len().next_multiple_of(2);
    let mut buf = vec![0u8; cell_offset + 24 * spec.cells.len()];
    buf[2] = spec.program_map.len() as u8;
    buf[3] = spec.cells.len() as u8;
    buf[4..8].copy_from_slice(&bcd_time(spec.secs));
    put_u16(&mut buf, 0xE6, PGC_PROGRAM_MAP as u16);
    put_u16(&mut buf, 0xE8, cell_offset as u16);
    buf[PGC_PROGRAM_MAP..PGC_PROGRAM_MAP + spec.program_map.len()]
        .copy_from_slice(&spec.program_map);

    for (i, cell) in spec.cells.iter().enumerate() {
        let c = cell_offset + 24 * i;
        buf[c] = match cell.block {
            CellBlock::Normal => 0x00,
            CellBlock::AngleMember => 0x50,
            CellBlock::AngleLast => 0xD0,
        };
        buf[c + 4..c + 8].copy_from_slice(&bcd_time(cell.secs));
        put_u32(&mut buf, c + 8, cell.first);
        put_u32(&mut buf, c + 20, cell.last);
    }
    buf
}

fn pgcit(pgcs: &[PgcSpec]) -> Vec<u8> {
    let header = 8 + 8 * pgcs.len();
    let bodies: Vec<Vec<u8>> = pgcs.iter().map(pgc).collect();
    let total = header + bodies.iter().map(Vec::len).sum::<usize>();

    let mut buf = vec![0u8; total];
    put_u16(&mut buf, 0, pgcs.len() as u16);
    put_u32(&mut buf, 4, (total - 1) as u32);

    let mut offset = header;
    for (i, body) in bodies.iter().enumerate() {
        buf[8 + 8 * i] = 0x80 | (i as u8 + 1);
        put_u32(&mut buf, 8 + 8 * i + 4, offset as u32);
        buf[offset..offset + body.len()].copy_from_slice(body);
        offset += body.len();
    }
    buf
}

/// Every sector starts with its big-endian sector number and is padded
/// with its low byte.
fn write_vobs(dir: &Path, title_set: usize, spec: &TitleSetSpec) {
    let mut part = 1;
    let mut sector = 0u32;
    while sector < spec.vob_sectors {
        let count = spec.vob_part_sectors.min(spec.vob_sectors - sector);
        let mut data = Vec::with_capacity(count as usize * SECTOR_SIZE);
        for s in sector..sector + count {
            let mut block = vec![s as u8; SECTOR_SIZE];
            block[..4].copy_from_slice(&s.to_be_bytes());
            data.extend_from_slice(&block);
        }
        fs::write(dir.join(format!("VTS_{title_set:02}_{part}.VOB")), data).unwrap();
        sector += count;
        part += 1;
    }
}

fn sectors_for(len: usize) -> usize {
    len.div_ceil(SECTOR_SIZE).max(1)
}

fn put_u16(buf: &mut [u8], off: usize, v: u16) {
    buf[off..off + 2].copy_from_slice(&v.to_be_bytes());
}

fn put_u32(buf: &mut [u8], off: usize, v: u32) {
    buf[off..off + 4].copy_from_slice(&v.to_be_bytes());
}
