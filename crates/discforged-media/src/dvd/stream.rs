//! DVD title as a buffered, seekable byte stream.

use super::cursor::LinearCursor;
use super::nav::NavigationGraph;
use super::{DvdDisc, TitleSet, VideoManager};
use crate::catalog::{Chapter, TieBreak, Title, TitleCatalog, TitleRef};
use crate::demux::ByteStream;
use crate::sector::{SectorSource, SECTOR_SIZE};
use crate::time::{rescale, Rational, DISC_TIME_BASE, MICROS_TIME_BASE};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::io::{self, Read, Seek, SeekFrom};

/// Default bridge buffer, in sectors.
pub const DEFAULT_BUFFER_SECTORS: usize = 16;

/// Open-time options for a DVD title stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DvdOptions {
    /// Title index (0-based). `None` picks the longest title.
    pub title: Option<u32>,
    /// Camera angle (0-based).
    pub angle: u32,
    /// Time base for the reported duration and chapters.
    pub time_base: Rational,
    /// Read buffer size in sectors.
    pub buffer_sectors: usize,
}

impl Default for DvdOptions {
    fn default() -> Self {
        Self {
            title: None,
            angle: 0,
            time_base: MICROS_TIME_BASE,
            buffer_sectors: DEFAULT_BUFFER_SECTORS,
        }
    }
}

/// Linear byte stream of one DVD title.
///
/// Fields drop in declaration order, releasing the title VOBs before the
/// disc handle.
pub struct DvdTitleStream<D> {
    cursor: LinearCursor<Box<dyn SectorSource>>,
    buffer: Vec<u8>,
    buf_pos: usize,
    buf_len: usize,
    /// Bytes to discard from the next refill after an unaligned seek.
    skip: usize,
    pos: u64,
    catalog: TitleCatalog,
    title: Title,
    duration: u64,
    chapters: Vec<Chapter>,
    time_base: Rational,
    volume_id: Option<String>,
    disc: D,
}

impl<D: DvdDisc> DvdTitleStream<D> {
    /// Scan the disc, select a title and position at its first cell.
    pub fn open(mut disc: D, options: &DvdOptions) -> Result<Self> {
        let volume_id = disc.volume_id();
        if let Some(id) = &volume_id {
            tracing::info!(volume_id = %id, "DVD volume");
        }

        let vmg = disc.open_vmg()?;
        let (catalog, mut title_sets) = scan_titles(&mut disc, &vmg)?;

        let title = catalog.select(options.title)?.clone();
        tracing::info!(title = title.index, "selected {title}");

        let entry = vmg.titles[title.index as usize];
        if entry.title_set_nr == 0 || u16::from(entry.title_set_nr) > vmg.title_set_count {
            return Err(Error::corrupt(format!(
                "title {} references title set {} (1..={})",
                title.index, entry.title_set_nr, vmg.title_set_count
            )));
        }

        let title_set = match title_sets.remove(&entry.title_set_nr) {
            Some(ts) => ts,
            None => disc.open_title_set(entry.title_set_nr)?,
        };
        let parts = title_set.parts_of(entry.vts_ttn).ok_or_else(|| {
            Error::corrupt(format!(
                "title {} references VTS title {} (1..={})",
                title.index,
                entry.vts_ttn,
                title_set.parts.len()
            ))
        })?;

        let angle_count = u32::from(entry.angle_count).max(1);
        if options.angle >= angle_count {
            return Err(Error::OutOfRange {
                what: "angle",
                value: options.angle,
                count: angle_count,
            });
        }

        let graph = NavigationGraph::resolve(&title_set, entry.vts_ttn, options.angle)?;
        let duration = graph.program_chain().playback_time.ticks();
        let chapters = graph
            .chapters(parts, duration)
            .into_iter()
            .map(|c| Chapter {
                index: c.index,
                start: rescale(c.start, DISC_TIME_BASE, options.time_base),
                end: rescale(c.end, DISC_TIME_BASE, options.time_base),
                time_base: options.time_base,
            })
            .collect();

        let vobs = disc.open_title_vobs(entry.title_set_nr)?;
        let cursor = LinearCursor::new(vobs, graph);
        cursor.check_mux_rate(duration);

        tracing::debug!(
            title_set = entry.title_set_nr,
            vts_ttn = entry.vts_ttn,
            pgcn = cursor.graph().pgcn(),
            cells = cursor.plan().len(),
            bytes = cursor.total_bytes(),
            "title stream ready"
        );

        Ok(Self {
            cursor,
            buffer: vec![0u8; options.buffer_sectors.max(1) * SECTOR_SIZE],
            buf_pos: 0,
            buf_len: 0,
            skip: 0,
            pos: 0,
            catalog,
            title,
            duration,
            chapters,
            time_base: options.time_base,
            volume_id,
            disc,
        })
    }

    pub fn disc(&self) -> &D {
        &self.disc
    }
}

impl<D> DvdTitleStream<D> {
    /// All titles on the disc.
    pub fn catalog(&self) -> &TitleCatalog {
        &self.catalog
    }

    /// The title being streamed.
    pub fn title(&self) -> &Title {
        &self.title
    }

    /// Duration in the caller's time base.
    pub fn duration(&self) -> i64 {
        rescale(self.duration as i64, DISC_TIME_BASE, self.time_base)
    }

    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    /// Chapters in the caller's time base.
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn volume_id(&self) -> Option<&str> {
        self.volume_id.as_deref()
    }

    /// Planned byte length of the title.
    pub fn size(&self) -> u64 {
        self.cursor.total_bytes()
    }

    pub fn cursor(&self) -> &LinearCursor<Box<dyn SectorSource>> {
        &self.cursor
    }

    fn refill(&mut self) -> Result<()> {
        let n = self.cursor.read(&mut self.buffer)?;
        let skip = self.skip.min(n);
        self.skip = 0;
        self.buf_pos = skip;
        self.buf_len = n;
        Ok(())
    }
}

impl<D> Read for DvdTitleStream<D> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while self.buf_pos >= self.buf_len {
            self.refill()?;
            if self.buf_len == 0 {
                return Ok(0);
            }
        }

        let n = buf.len().min(self.buf_len - self.buf_pos);
        buf[..n].copy_from_slice(&self.buffer[self.buf_pos..self.buf_pos + n]);
        self.buf_pos += n;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<D> Seek for DvdTitleStream<D> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(p) => Some(p),
            SeekFrom::Current(d) => self.pos.checked_add_signed(d),
            SeekFrom::End(d) => self.cursor.total_bytes().checked_add_signed(d),
        }
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "seek before start of title"))?;

        let aligned = self.cursor.seek_to_byte(target);
        self.skip = target.saturating_sub(aligned) as usize;
        self.buf_pos = 0;
        self.buf_len = 0;
        self.pos = target;
        Ok(target)
    }
}

impl<D> ByteStream for DvdTitleStream<D> {
    fn size(&mut self) -> Option<u64> {
        Some(self.cursor.total_bytes())
    }
}

/// Build the title catalog of `disc` without opening any title.
///
/// Auto-selection over the result picks the same title
/// [`DvdTitleStream::open`] would.
pub fn scan_catalog<D: DvdDisc>(disc: &mut D) -> Result<TitleCatalog> {
    let vmg = disc.open_vmg()?;
    let (catalog, _) = scan_titles(disc, &vmg)?;
    Ok(catalog)
}

/// Read every title set once and build the catalog.
///
/// Candidates are visited title set by title set, then by title index. A
/// title whose tables cannot be followed is kept in the catalog with zero
/// duration but is never picked automatically. A title set that cannot be
/// opened fails the scan.
fn scan_titles<D: DvdDisc>(
    disc: &mut D,
    vmg: &VideoManager,
) -> Result<(TitleCatalog, BTreeMap<u8, TitleSet>)> {
    let mut title_sets = BTreeMap::new();
    let mut durations = vec![None; vmg.titles.len()];
    let mut unit_counts = vec![0u32; vmg.titles.len()];
    let mut candidates = Vec::new();

    for ts_nr in 1..=vmg.title_set_count.min(u8::MAX as u16) as u8 {
        if !vmg.titles.iter().any(|t| t.title_set_nr == ts_nr) {
            continue;
        }
        let title_set = disc.open_title_set(ts_nr)?;

        for (i, entry) in vmg.titles.iter().enumerate() {
            if entry.title_set_nr != ts_nr {
                continue;
            }
            if title_set.program_chains.is_none() {
                tracing::trace!(title = i, title_set = ts_nr, "title set has no PGC info");
                continue;
            }

            let Some(first) = title_set.parts_of(entry.vts_ttn).and_then(<[_]>::first) else {
                tracing::warn!(
                    title = i,
                    vts_ttn = entry.vts_ttn,
                    "skipping title with out-of-bounds VTS title"
                );
                continue;
            };
            let Some(pgc) = title_set.program_chain(first.pgcn) else {
                tracing::warn!(title = i, pgcn = first.pgcn, "skipping title with missing PGC");
                continue;
            };

            durations[i] = Some(pgc.playback_time.ticks());
            unit_counts[i] = pgc.cells.len() as u32;
            candidates.push(i);
        }

        title_sets.insert(ts_nr, title_set);
    }

    let titles: Vec<Title> = vmg
        .titles
        .iter()
        .enumerate()
        .map(|(i, entry)| Title {
            index: i as u32,
            duration: durations[i].unwrap_or(0),
            chapter_count: u32::from(entry.ptt_count),
            unit_count: unit_counts[i],
            angle_count: u32::from(entry.angle_count),
            reference: TitleRef::Dvd {
                title_set: entry.title_set_nr,
                vts_ttn: entry.vts_ttn,
            },
        })
        .collect();

    tracing::info!(titles = candidates.len(), "usable titles");
    for &i in &candidates {
        tracing::info!("{}", titles[i]);
    }

    let catalog = TitleCatalog::new(titles, TieBreak::LastMax)
        .with_candidates(candidates)
        .with_whole_second_key();
    Ok((catalog, title_sets))
}
