//! Sector-level walk over a navigation graph.

use super::nav::{NavigationGraph, PlannedUnit};
use crate::sector::{SectorSource, SECTOR_SIZE};
use crate::time::DISC_CLOCK_HZ;
use crate::{Error, Result};

/// Maximum DVD-Video program stream mux rate, in bits per second.
pub const MAX_MUX_RATE: u64 = 10_080_000;

/// Position within the active unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationCursor {
    /// Index into the plan.
    pub unit: usize,
    /// Cell index within the program chain.
    pub cell: usize,
    pub current_sector: u32,
    pub start_sector: u32,
    /// Exclusive end sector of the active unit.
    pub end_sector: u32,
    pub angle: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Inside the active unit with sectors remaining.
    Positioned(u32),
    /// Active unit fully read; the next read moves to the following unit.
    AtUnitBoundary,
    /// No further units. Terminal until a seek.
    Exhausted,
}

/// Walks a navigation graph, reading whole sectors without ever crossing a
/// unit boundary within one call.
pub struct LinearCursor<S> {
    source: S,
    graph: NavigationGraph,
    plan: Vec<PlannedUnit>,
    nav: NavigationCursor,
    state: CursorState,
    total_bytes: u64,
}

impl<S: SectorSource> LinearCursor<S> {
    /// Position a cursor at the graph's entry cell.
    pub fn new(source: S, graph: NavigationGraph) -> Self {
        let plan = graph.plan();
        let total_bytes = plan.last().map_or(0, |u| u.byte_offset + u.byte_len());
        let mut cursor = Self {
            source,
            nav: NavigationCursor {
                angle: graph.angle(),
                ..Default::default()
            },
            graph,
            plan,
            state: CursorState::Exhausted,
            total_bytes,
        };
        if !cursor.plan.is_empty() {
            cursor.enter(0, None);
        }
        cursor
    }

    /// Make plan unit `unit` active, at `sector` or its first sector.
    fn enter(&mut self, unit: usize, sector: Option<u32>) {
        let planned = self.plan[unit];
        let current = sector.unwrap_or(planned.first_sector);
        self.nav = NavigationCursor {
            unit,
            cell: planned.cell,
            current_sector: current,
            start_sector: planned.first_sector,
            end_sector: planned.end_sector,
            angle: self.nav.angle,
        };
        self.state = if current < planned.end_sector {
            CursorState::Positioned(current)
        } else {
            CursorState::AtUnitBoundary
        };
    }

    /// Move past the active unit.
    fn advance(&mut self) {
        match self.graph.next_unit(self.nav.cell) {
            Some(cell) => {
                let unit = self.nav.unit + 1;
                debug_assert_eq!(self.plan.get(unit).map(|u| u.cell), Some(cell));
                tracing::trace!(cell, unit, "entering next cell");
                self.enter(unit, None);
            }
            None => {
                tracing::debug!(cell = self.nav.cell, "end of program chain");
                self.state = CursorState::Exhausted;
            }
        }
    }

    /// Read whole sectors into `buf`.
    ///
    /// At most `buf.len() / SECTOR_SIZE` sectors are read, clamped to those
    /// left in the active unit. Returns the byte count, 0 at the end of the
    /// title. A read of zero blocks is an I/O error.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.len() < SECTOR_SIZE {
            return Err(Error::BufferUnderflow {
                need: SECTOR_SIZE,
                have: buf.len(),
            });
        }

        let current = loop {
            match self.state {
                CursorState::Exhausted => return Ok(0),
                CursorState::AtUnitBoundary => self.advance(),
                CursorState::Positioned(sector) => break sector,
            }
        };

        let remaining = self.nav.end_sector - current;
        let requested = ((buf.len() / SECTOR_SIZE) as u32).min(remaining);
        let len = requested as usize * SECTOR_SIZE;

        let read = self.source.read_blocks(current, requested, &mut buf[..len])?;
        if read == 0 {
            return Err(Error::short_read(current, requested));
        }
        let read = read.min(requested);

        self.nav.current_sector = current + read;
        self.state = if self.nav.current_sector >= self.nav.end_sector {
            CursorState::AtUnitBoundary
        } else {
            CursorState::Positioned(self.nav.current_sector)
        };

        Ok(read as usize * SECTOR_SIZE)
    }

    /// Reposition to the sector holding linear byte `pos`.
    ///
    /// Returns the sector-aligned byte position actually reached; the caller
    /// discards `pos - returned` bytes of the next read. Seeking to or past
    /// the end exhausts the cursor.
    pub fn seek_to_byte(&mut self, pos: u64) -> u64 {
        if pos >= self.total_bytes {
            self.state = CursorState::Exhausted;
            return self.total_bytes;
        }

        let unit = self.plan.partition_point(|u| u.byte_offset <= pos) - 1;
        let planned = self.plan[unit];
        let sectors = (pos - planned.byte_offset) / SECTOR_SIZE as u64;
        self.enter(unit, Some(planned.first_sector + sectors as u32));
        planned.byte_offset + sectors * SECTOR_SIZE as u64
    }

    /// Current sector-aligned byte position in the linear stream.
    pub fn position(&self) -> u64 {
        match self.state {
            CursorState::Exhausted => self.total_bytes,
            _ => {
                let unit = &self.plan[self.nav.unit];
                unit.byte_offset
                    + (self.nav.current_sector - self.nav.start_sector) as u64 * SECTOR_SIZE as u64
            }
        }
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn nav(&self) -> &NavigationCursor {
        &self.nav
    }

    pub fn graph(&self) -> &NavigationGraph {
        &self.graph
    }

    pub fn plan(&self) -> &[PlannedUnit] {
        &self.plan
    }

    /// Total bytes in traversal order.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Warn when the planned length cannot be played back in `duration`
    /// (90 kHz ticks) at the maximum mux rate.
    pub fn check_mux_rate(&self, duration: u64) {
        if exceeds_mux_rate(self.total_bytes, duration) {
            tracing::warn!(
                bytes = self.total_bytes,
                duration_secs = duration / DISC_CLOCK_HZ as u64,
                "title larger than its duration allows at the maximum mux rate"
            );
        }
    }
}

/// Whether `bytes` exceed what `duration` ticks carry at [`MAX_MUX_RATE`].
pub fn exceeds_mux_rate(bytes: u64, duration: u64) -> bool {
    let max_bytes = duration as u128 * MAX_MUX_RATE as u128 / 8 / DISC_CLOCK_HZ as u128;
    bytes as u128 > max_bytes
}
