//! DVD-Video navigation.
//!
//! The disc index is read through the [`DvdDisc`] trait, which mirrors the
//! subset of a DVD reader library this crate consumes:
//!
//! - `VIDEO_TS.IFO` → [`VideoManager`] (title search pointer table)
//! - `VTS_nn_0.IFO` → [`TitleSet`] (part-of-title table, program chains)
//! - `VTS_nn_[1-9].VOB` → a [`SectorSource`] addressed by cell sectors
//!
//! [`VideoTsFolder`] implements it natively over an unpacked `VIDEO_TS`
//! directory. On top of that, [`NavigationGraph`] collapses a program chain
//! into a linear cell order, [`LinearCursor`] walks it sector by sector and
//! [`DvdTitleStream`] exposes the result as a seekable byte stream.

mod cursor;
mod folder;
pub mod ifo;
mod nav;
mod stream;

pub use cursor::{
    exceeds_mux_rate, CursorState, LinearCursor, NavigationCursor, MAX_MUX_RATE,
};
pub use folder::{VideoTsFolder, VobSet};
pub use nav::{NavigationGraph, PlannedUnit};
pub use stream::{scan_catalog, DvdOptions, DvdTitleStream, DEFAULT_BUFFER_SECTORS};

use crate::time::DvdTime;
use crate::{Result, SectorSource};

/// Read access to a DVD's navigation files and title VOBs.
pub trait DvdDisc {
    /// Disc volume identifier, if known.
    fn volume_id(&self) -> Option<String> {
        None
    }

    /// Open the video manager information (title set 0).
    fn open_vmg(&mut self) -> Result<VideoManager>;

    /// Open the information file of title set `title_set` (1-based).
    fn open_title_set(&mut self, title_set: u8) -> Result<TitleSet>;

    /// Open the title VOBs of `title_set` as one sector-addressed store.
    fn open_title_vobs(&mut self, title_set: u8) -> Result<Box<dyn SectorSource>>;
}

/// Video manager information: the disc-wide title table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoManager {
    /// Number of video title sets on the disc.
    pub title_set_count: u16,
    /// Title search pointers, in title order.
    pub titles: Vec<TitleEntry>,
}

/// One title search pointer (TT_SRPT entry).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TitleEntry {
    /// Playback type flags.
    pub playback_type: u8,
    /// Number of camera angles.
    pub angle_count: u8,
    /// Number of chapters (parts of title).
    pub ptt_count: u16,
    /// Parental management mask.
    pub parental_mask: u16,
    /// Title set holding this title (1-based).
    pub title_set_nr: u8,
    /// Title number within the title set (1-based).
    pub vts_ttn: u8,
    /// Start sector of the title set on disc.
    pub title_set_sector: u32,
}

/// Video title set information.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleSet {
    /// Per-VTS-title chapter lists (VTS_PTT_SRPT), indexed by `vts_ttn - 1`.
    pub parts: Vec<Vec<PartOfTitle>>,
    /// Program chains (VTS_PGCIT), indexed by `pgcn - 1`. `None` when the
    /// title set carries no program chain table.
    pub program_chains: Option<Vec<ProgramChain>>,
}

impl TitleSet {
    /// Chapter list of 1-based VTS title `vts_ttn`.
    pub fn parts_of(&self, vts_ttn: u8) -> Option<&[PartOfTitle]> {
        let idx = (vts_ttn as usize).checked_sub(1)?;
        self.parts.get(idx).map(Vec::as_slice)
    }

    /// Program chain `pgcn` (1-based).
    pub fn program_chain(&self, pgcn: u16) -> Option<&ProgramChain> {
        let idx = (pgcn as usize).checked_sub(1)?;
        self.program_chains.as_ref()?.get(idx)
    }
}

/// A chapter entry point: program `pgn` of program chain `pgcn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartOfTitle {
    pub pgcn: u16,
    pub pgn: u16,
}

/// An ordered list of cells forming one playable sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramChain {
    pub playback_time: DvdTime,
    /// 1-based entry cell of each program.
    pub program_map: Vec<u8>,
    pub cells: Vec<Cell>,
}

/// Angle-block membership of a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CellBlock {
    /// Not part of an angle block.
    #[default]
    Normal,
    /// Member of an angle block, not the last one.
    AngleMember,
    /// Last member of an angle block.
    AngleLast,
}

impl CellBlock {
    /// Map the on-disc block mode and block type fields.
    pub fn from_mode_and_type(block_mode: u8, block_type: u8) -> Self {
        const BLOCK_TYPE_ANGLE: u8 = 1;
        const BLOCK_MODE_LAST_CELL: u8 = 3;

        match (block_type, block_mode) {
            (BLOCK_TYPE_ANGLE, BLOCK_MODE_LAST_CELL) => Self::AngleLast,
            (BLOCK_TYPE_ANGLE, _) => Self::AngleMember,
            _ => Self::Normal,
        }
    }

    pub fn is_angle(&self) -> bool {
        !matches!(self, Self::Normal)
    }
}

/// A contiguous sector range within a program chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    /// First sector (inclusive), relative to the title VOBs.
    pub first_sector: u32,
    /// Last sector (inclusive).
    pub last_sector: u32,
    pub block: CellBlock,
    pub playback_time: DvdTime,
}

impl Cell {
    /// Exclusive end sector. Navigation rejects cells ending at `u32::MAX`.
    pub fn end_sector(&self) -> u32 {
        self.last_sector.saturating_add(1)
    }

    /// Sector count.
    pub fn sectors(&self) -> u32 {
        self.end_sector().saturating_sub(self.first_sector)
    }
}
