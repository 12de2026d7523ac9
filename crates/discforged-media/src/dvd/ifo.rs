//! IFO (DVD navigation file) parsing.
//!
//! Only the tables needed for title selection and cell traversal are
//! decoded:
//!
//! - VMGI_MAT / TT_SRPT from `VIDEO_TS.IFO`
//! - VTSI_MAT / VTS_PTT_SRPT / VTS_PGCIT from `VTS_nn_0.IFO`
//!
//! Table pointers in the management header are sector numbers relative to
//! the start of the IFO; offsets inside tables are byte offsets relative to
//! the table start. Any pointer that runs past the file is reported as
//! [`Error::CorruptIndex`].

use super::{Cell, CellBlock, PartOfTitle, ProgramChain, TitleEntry, TitleSet, VideoManager};
use crate::sector::SECTOR_SIZE;
use crate::time::DvdTime;
use crate::{Error, Result};
use std::io::Read;

/// Maximum IFO size accepted (8 MB) to prevent OOM on malformed files.
const MAX_IFO_SIZE: u64 = 8 * 1024 * 1024;

pub const VMG_IDENTIFIER: &[u8; 12] = b"DVDVIDEO-VMG";
pub const VTS_IDENTIFIER: &[u8; 12] = b"DVDVIDEO-VTS";

// VMGI_MAT
const VMG_TITLE_SET_COUNT: usize = 0x3E;
const VMG_TT_SRPT: usize = 0xC4;

// VTSI_MAT
const VTS_PTT_SRPT: usize = 0xC8;
const VTS_PGCIT: usize = 0xCC;

// PGC
const PGC_PROGRAM_COUNT: usize = 0x02;
const PGC_CELL_COUNT: usize = 0x03;
const PGC_PLAYBACK_TIME: usize = 0x04;
const PGC_PROGRAM_MAP_OFFSET: usize = 0xE6;
const PGC_CELL_PLAYBACK_OFFSET: usize = 0xE8;

/// Size of the common table header (count, reserved, last byte).
const TABLE_HEADER_SIZE: usize = 8;
const TT_SRPT_ENTRY_SIZE: usize = 12;
const PGCI_SRP_SIZE: usize = 8;
const CELL_PLAYBACK_SIZE: usize = 24;

/// Read a whole IFO file into memory.
pub fn read_ifo<R: Read>(reader: R) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    reader.take(MAX_IFO_SIZE + 1).read_to_end(&mut data)?;
    if data.len() as u64 > MAX_IFO_SIZE {
        return Err(Error::corrupt(format!(
            "IFO larger than {MAX_IFO_SIZE} bytes"
        )));
    }
    Ok(data)
}

/// Bounds-checked big-endian view over IFO bytes.
struct IfoData<'a> {
    data: &'a [u8],
    name: &'static str,
}

impl<'a> IfoData<'a> {
    fn new(data: &'a [u8], name: &'static str) -> Self {
        Self { data, name }
    }

    fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| {
                Error::corrupt(format!(
                    "{}: {} bytes at offset {:#x} exceed file size {}",
                    self.name,
                    len,
                    offset,
                    self.data.len()
                ))
            })
    }

    fn u8_at(&self, offset: usize) -> Result<u8> {
        Ok(self.slice(offset, 1)?[0])
    }

    fn u16_at(&self, offset: usize) -> Result<u16> {
        let b = self.slice(offset, 2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32_at(&self, offset: usize) -> Result<u32> {
        let b = self.slice(offset, 4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn time_at(&self, offset: usize) -> Result<DvdTime> {
        let b = self.slice(offset, 4)?;
        Ok(DvdTime::from_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn expect_identifier(&self, id: &[u8; 12]) -> Result<()> {
        if self.slice(0, id.len())? != id {
            return Err(Error::corrupt(format!(
                "{}: missing {} identifier",
                self.name,
                String::from_utf8_lossy(id)
            )));
        }
        Ok(())
    }

    /// Byte offset of a table addressed by a sector pointer, `None` if the
    /// pointer is zero (table absent).
    fn table_at(&self, pointer_offset: usize) -> Result<Option<usize>> {
        let sector = self.u32_at(pointer_offset)? as usize;
        if sector == 0 {
            return Ok(None);
        }
        let base = sector
            .checked_mul(SECTOR_SIZE)
            .filter(|&b| b < self.data.len())
            .ok_or_else(|| {
                Error::corrupt(format!(
                    "{}: table pointer at {:#x} (sector {}) outside file",
                    self.name, pointer_offset, sector
                ))
            })?;
        Ok(Some(base))
    }
}

/// Parse `VIDEO_TS.IFO`.
pub fn parse_vmg(data: &[u8]) -> Result<VideoManager> {
    let ifo = IfoData::new(data, "VIDEO_TS.IFO");
    ifo.expect_identifier(VMG_IDENTIFIER)?;

    let title_set_count = ifo.u16_at(VMG_TITLE_SET_COUNT)?;
    let base = ifo
        .table_at(VMG_TT_SRPT)?
        .ok_or_else(|| Error::corrupt("VIDEO_TS.IFO: no title search pointer table"))?;

    let count = ifo.u16_at(base)? as usize;
    let mut titles = Vec::with_capacity(count);
    for i in 0..count {
        let off = base + TABLE_HEADER_SIZE + i * TT_SRPT_ENTRY_SIZE;
        let entry = ifo.slice(off, TT_SRPT_ENTRY_SIZE)?;
        titles.push(TitleEntry {
            playback_type: entry[0],
            angle_count: entry[1],
            ptt_count: u16::from_be_bytes([entry[2], entry[3]]),
            parental_mask: u16::from_be_bytes([entry[4], entry[5]]),
            title_set_nr: entry[6],
            vts_ttn: entry[7],
            title_set_sector: u32::from_be_bytes([entry[8], entry[9], entry[10], entry[11]]),
        });
    }

    Ok(VideoManager {
        title_set_count,
        titles,
    })
}

/// Parse `VTS_nn_0.IFO`.
pub fn parse_vts(data: &[u8]) -> Result<TitleSet> {
    let ifo = IfoData::new(data, "VTS IFO");
    ifo.expect_identifier(VTS_IDENTIFIER)?;

    let parts = match ifo.table_at(VTS_PTT_SRPT)? {
        Some(base) => parse_ptt_srpt(&ifo, base)?,
        None => Vec::new(),
    };

    let program_chains = match ifo.table_at(VTS_PGCIT)? {
        Some(base) => Some(parse_pgcit(&ifo, base)?),
        None => None,
    };

    Ok(TitleSet {
        parts,
        program_chains,
    })
}

fn parse_ptt_srpt(ifo: &IfoData<'_>, base: usize) -> Result<Vec<Vec<PartOfTitle>>> {
    let count = ifo.u16_at(base)? as usize;
    // Last byte of the table, relative to its start.
    let table_end = ifo.u32_at(base + 4)? as usize + 1;

    let mut offsets = Vec::with_capacity(count);
    for i in 0..count {
        offsets.push(ifo.u32_at(base + TABLE_HEADER_SIZE + i * 4)? as usize);
    }

    let mut parts = Vec::with_capacity(count);
    for (i, &start) in offsets.iter().enumerate() {
        let end = offsets.get(i + 1).copied().unwrap_or(table_end);
        if end < start {
            return Err(Error::corrupt(format!(
                "VTS_PTT_SRPT: title {} offsets decrease ({start:#x} > {end:#x})",
                i + 1
            )));
        }
        let entries = ifo.slice(base + start, end - start)?;
        let ptts = entries
            .chunks_exact(4)
            .map(|e| PartOfTitle {
                pgcn: u16::from_be_bytes([e[0], e[1]]),
                pgn: u16::from_be_bytes([e[2], e[3]]),
            })
            .collect();
        parts.push(ptts);
    }

    Ok(parts)
}

fn parse_pgcit(ifo: &IfoData<'_>, base: usize) -> Result<Vec<ProgramChain>> {
    let count = ifo.u16_at(base)? as usize;
    let mut chains = Vec::with_capacity(count);

    for i in 0..count {
        let srp = base + TABLE_HEADER_SIZE + i * PGCI_SRP_SIZE;
        let pgc_offset = ifo.u32_at(srp + 4)? as usize;
        chains.push(parse_pgc(ifo, base + pgc_offset)?);
    }

    Ok(chains)
}

fn parse_pgc(ifo: &IfoData<'_>, pgc: usize) -> Result<ProgramChain> {
    let program_count = ifo.u8_at(pgc + PGC_PROGRAM_COUNT)? as usize;
    let cell_count = ifo.u8_at(pgc + PGC_CELL_COUNT)? as usize;
    let playback_time = ifo.time_at(pgc + PGC_PLAYBACK_TIME)?;

    let program_map = if program_count > 0 {
        let offset = ifo.u16_at(pgc + PGC_PROGRAM_MAP_OFFSET)? as usize;
        if offset == 0 {
            return Err(Error::corrupt(format!(
                "PGC at {pgc:#x}: {program_count} programs but no program map"
            )));
        }
        ifo.slice(pgc + offset, program_count)?.to_vec()
    } else {
        Vec::new()
    };

    let cells = if cell_count > 0 {
        let offset = ifo.u16_at(pgc + PGC_CELL_PLAYBACK_OFFSET)? as usize;
        if offset == 0 {
            return Err(Error::corrupt(format!(
                "PGC at {pgc:#x}: {cell_count} cells but no cell playback table"
            )));
        }
        ifo.slice(pgc + offset, cell_count * CELL_PLAYBACK_SIZE)?
            .chunks_exact(CELL_PLAYBACK_SIZE)
            .map(parse_cell_playback)
            .collect()
    } else {
        Vec::new()
    };

    Ok(ProgramChain {
        playback_time,
        program_map,
        cells,
    })
}

fn parse_cell_playback(e: &[u8]) -> Cell {
    let block_mode = e[0] >> 6;
    let block_type = (e[0] >> 4) & 0x03;
    Cell {
        first_sector: u32::from_be_bytes([e[8], e[9], e[10], e[11]]),
        last_sector: u32::from_be_bytes([e[20], e[21], e[22], e[23]]),
        block: CellBlock::from_mode_and_type(block_mode, block_type),
        playback_time: DvdTime::from_bytes([e[4], e[5], e[6], e[7]]),
    }
}
