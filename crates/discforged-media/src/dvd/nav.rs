//! Program chain traversal with angle-block substitution.

use super::{CellBlock, PartOfTitle, ProgramChain, TitleSet};
use crate::catalog::Chapter;
use crate::sector::lba_to_bytes;
use crate::{Error, Result};

/// Read-only traversal graph of one program chain with a fixed angle.
///
/// Cells are addressed by their 0-based position in the chain. The graph
/// never stores "next" links: [`NavigationGraph::next_unit`] computes them.
#[derive(Debug, Clone)]
pub struct NavigationGraph {
    pgcn: u16,
    pgc: ProgramChain,
    /// Inclusive `(first, last)` cell ranges of every angle block.
    blocks: Vec<(usize, usize)>,
    angle: u32,
    entry: usize,
}

/// One cell in linear playback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedUnit {
    /// Cell index within the program chain.
    pub cell: usize,
    pub first_sector: u32,
    /// Exclusive end sector.
    pub end_sector: u32,
    /// Byte offset of the first sector in the linear stream.
    pub byte_offset: u64,
    /// Start time in 90 kHz ticks.
    pub start_time: u64,
}

impl PlannedUnit {
    /// Byte length of the unit.
    pub fn byte_len(&self) -> u64 {
        lba_to_bytes(self.end_sector - self.first_sector)
    }
}

impl NavigationGraph {
    /// Resolve the chain that plays VTS title `vts_ttn` (1-based) from its
    /// first chapter.
    pub fn resolve(title_set: &TitleSet, vts_ttn: u8, angle: u32) -> Result<Self> {
        let parts = title_set.parts_of(vts_ttn).ok_or_else(|| {
            Error::corrupt(format!(
                "VTS title {vts_ttn} outside part-of-title table (1..={})",
                title_set.parts.len()
            ))
        })?;
        let first = parts
            .first()
            .ok_or_else(|| Error::corrupt(format!("VTS title {vts_ttn} has no chapters")))?;
        let pgc = title_set.program_chain(first.pgcn).ok_or_else(|| {
            Error::corrupt(format!(
                "VTS title {vts_ttn} references missing program chain {}",
                first.pgcn
            ))
        })?;

        Self::new(first.pgcn, pgc.clone(), first.pgn, angle)
    }

    /// Build the graph for program chain `pgcn`, entered at program `pgn`
    /// (1-based), playing angle `angle` (0-based).
    pub fn new(pgcn: u16, pgc: ProgramChain, pgn: u16, angle: u32) -> Result<Self> {
        let blocks = validate_cells(&pgc)?;

        if let Some(&(first, last)) = blocks.iter().find(|(f, l)| angle as usize > l - f) {
            return Err(Error::OutOfRange {
                what: "angle",
                value: angle,
                count: (last - first + 1) as u32,
            });
        }

        let mut graph = Self {
            pgcn,
            pgc,
            blocks,
            angle,
            entry: 0,
        };
        let cell = graph.program_entry_cell(pgn)?;
        graph.entry = graph.with_angle(cell)?;
        Ok(graph)
    }

    /// 0-based entry cell of program `pgn` before angle substitution.
    fn program_entry_cell(&self, pgn: u16) -> Result<usize> {
        let cell_nr = (pgn as usize)
            .checked_sub(1)
            .and_then(|i| self.pgc.program_map.get(i))
            .copied()
            .ok_or_else(|| {
                Error::corrupt(format!(
                    "program {pgn} outside program map (1..={})",
                    self.pgc.program_map.len()
                ))
            })?;

        let cell = (cell_nr as usize)
            .checked_sub(1)
            .filter(|&c| c < self.pgc.cells.len())
            .ok_or_else(|| {
                Error::corrupt(format!(
                    "program {pgn} entry cell {cell_nr} outside chain (1..={})",
                    self.pgc.cells.len()
                ))
            })?;
        Ok(cell)
    }

    /// Substitute the selected angle for a cell inside an angle block.
    ///
    /// The angle is counted from the block's first member, wherever in the
    /// block `cell` points.
    fn with_angle(&self, cell: usize) -> Result<usize> {
        match self.block_of(cell) {
            Some((first, last)) => {
                let target = first + self.angle as usize;
                if target > last {
                    return Err(Error::OutOfRange {
                        what: "angle",
                        value: self.angle,
                        count: (last - first + 1) as u32,
                    });
                }
                Ok(target)
            }
            None => Ok(cell),
        }
    }

    fn block_of(&self, cell: usize) -> Option<(usize, usize)> {
        self.blocks
            .iter()
            .copied()
            .find(|&(first, last)| (first..=last).contains(&cell))
    }

    /// Cell index following `current` in playback order, or `None` at the
    /// end of the chain.
    ///
    /// Sibling angle members are skipped, and entering an angle block lands
    /// on the selected angle.
    pub fn next_unit(&self, current: usize) -> Option<usize> {
        if current >= self.pgc.cells.len() {
            return None;
        }

        let mut next = match self.block_of(current) {
            Some((_, last)) => last + 1,
            None => current + 1,
        };
        if next >= self.pgc.cells.len() {
            return None;
        }

        if self.pgc.cells[next].block.is_angle() {
            next += self.angle as usize;
        }
        Some(next)
    }

    /// Materialise the traversal order from the entry cell.
    pub fn plan(&self) -> Vec<PlannedUnit> {
        let mut units = Vec::new();
        let mut byte_offset = 0u64;
        let mut start_time = 0u64;
        let mut current = Some(self.entry);

        while let Some(idx) = current {
            let cell = &self.pgc.cells[idx];
            let unit = PlannedUnit {
                cell: idx,
                first_sector: cell.first_sector,
                end_sector: cell.end_sector(),
                byte_offset,
                start_time,
            };
            byte_offset += unit.byte_len();
            start_time += cell.playback_time.ticks();
            units.push(unit);
            current = self.next_unit(idx);
        }

        units
    }

    /// Chapters of the played chain, in 90 kHz ticks.
    ///
    /// Each part of title in this chain starts at its program's entry cell.
    /// Chapter ends are the next chapter's start, or `title_end`.
    pub fn chapters(&self, parts: &[PartOfTitle], title_end: u64) -> Vec<Chapter> {
        let plan = self.plan();
        let mut starts: Vec<(u32, u64)> = Vec::with_capacity(parts.len());

        for (i, ptt) in parts.iter().enumerate() {
            if ptt.pgcn != self.pgcn {
                tracing::debug!(
                    chapter = i,
                    pgcn = ptt.pgcn,
                    played = self.pgcn,
                    "skipping chapter in another program chain"
                );
                continue;
            }

            let cell = match self
                .program_entry_cell(ptt.pgn)
                .and_then(|c| self.with_angle(c))
            {
                Ok(cell) => cell,
                Err(e) => {
                    tracing::warn!(chapter = i, pgn = ptt.pgn, error = %e, "skipping chapter");
                    continue;
                }
            };

            match plan.iter().find(|u| u.cell == cell) {
                Some(unit) => starts.push((i as u32, unit.start_time)),
                None => tracing::debug!(chapter = i, cell, "chapter cell not on playback path"),
            }
        }

        starts
            .iter()
            .enumerate()
            .map(|(n, &(index, start))| {
                let end = starts
                    .get(n + 1)
                    .map_or(title_end, |&(_, next)| next)
                    .max(start);
                Chapter::native(index, start, end)
            })
            .collect()
    }

    /// Entry cell after angle substitution.
    pub fn entry(&self) -> usize {
        self.entry
    }

    pub fn angle(&self) -> u32 {
        self.angle
    }

    /// Program chain number (1-based) being played.
    pub fn pgcn(&self) -> u16 {
        self.pgcn
    }

    pub fn program_chain(&self) -> &ProgramChain {
        &self.pgc
    }
}

/// Check sector ranges and angle-block termination. Returns the angle
/// blocks as inclusive cell ranges.
fn validate_cells(pgc: &ProgramChain) -> Result<Vec<(usize, usize)>> {
    let mut blocks = Vec::new();
    let mut open: Option<usize> = None;

    for (i, cell) in pgc.cells.iter().enumerate() {
        if cell.last_sector == u32::MAX {
            return Err(Error::corrupt(format!(
                "cell {} ends at sector {}, past the addressable range",
                i + 1,
                cell.last_sector
            )));
        }
        if cell.last_sector < cell.first_sector {
            return Err(Error::corrupt(format!(
                "cell {} ends at sector {} before it starts at {}",
                i + 1,
                cell.last_sector,
                cell.first_sector
            )));
        }

        match cell.block {
            CellBlock::Normal => {
                if let Some(start) = open {
                    return Err(Error::corrupt(format!(
                        "angle block at cell {} not terminated before cell {}",
                        start + 1,
                        i + 1
                    )));
                }
            }
            CellBlock::AngleMember => {
                open.get_or_insert(i);
            }
            CellBlock::AngleLast => {
                blocks.push((open.take().unwrap_or(i), i));
            }
        }
    }

    if let Some(start) = open {
        return Err(Error::corrupt(format!(
            "angle block at cell {} runs past end of chain",
            start + 1
        )));
    }

    Ok(blocks)
}
