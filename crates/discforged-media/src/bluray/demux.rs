//! Blu-ray demuxer: title selection plus an embedded transport demuxer.

use super::{BlurayDisc, BlurayStream};
use crate::catalog::{Chapter, TieBreak, Title, TitleCatalog, TitleRef};
use crate::demux::{ElementaryStream, Packet, Program, TransportDemuxer};
use crate::time::{rescale, Rational, DISC_TIME_BASE, MICROS_TIME_BASE};
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Shortest title considered relevant, in seconds.
pub const MIN_TITLE_LENGTH: u32 = 180;

/// Open-time options for a Blu-ray demuxer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlurayOptions {
    /// Title index (0-based). `None` picks the main title, else the longest.
    pub title: Option<u32>,
    /// Titles shorter than this many seconds are not listed.
    pub min_title_length: u32,
    /// Time base for the reported duration and chapters.
    pub time_base: Rational,
}

impl Default for BlurayOptions {
    fn default() -> Self {
        Self {
            title: None,
            min_title_length: MIN_TITLE_LENGTH,
            time_base: MICROS_TIME_BASE,
        }
    }
}

/// Demuxer for one Blu-ray title.
///
/// Owns the transport demuxer, which owns the title stream and through it
/// the disc.
pub struct BlurayDemuxer<T> {
    demuxer: T,
    catalog: TitleCatalog,
    title: Title,
    duration: i64,
    time_base: Rational,
    chapters: Vec<Chapter>,
    metadata: BTreeMap<String, String>,
    programs: Vec<Program>,
    streams: Vec<ElementaryStream>,
}

impl<T: TransportDemuxer> BlurayDemuxer<T> {
    /// Select a title on `disc` and open `demuxer` over its byte stream.
    pub fn open<B>(mut disc: B, mut demuxer: T, options: &BlurayOptions) -> Result<Self>
    where
        B: BlurayDisc + 'static,
    {
        let disc_info = disc.disc_info()?;
        let mut metadata = BTreeMap::new();
        if let Some(name) = &disc_info.name {
            tracing::info!(name = %name, "opening bluray disc");
            metadata.insert("title".to_string(), name.clone());
        }

        let count = disc.title_count(options.min_title_length)?;
        tracing::info!(titles = count, "usable titles");
        if count == 0 {
            return Err(Error::not_found(format!(
                "no titles of at least {} seconds",
                options.min_title_length
            )));
        }
        if let Some(main) = disc_info.main_title {
            tracing::info!(main_title = main, "main title is assumed to be {main}");
        }

        let mut titles = Vec::with_capacity(count as usize);
        for i in 0..count {
            let info = disc.title_info(i)?;
            let title = Title {
                index: i,
                duration: info.duration,
                chapter_count: info.chapters.len() as u32,
                unit_count: info.clips.len() as u32,
                angle_count: info.angle_count,
                reference: TitleRef::Bluray {
                    playlist: info.playlist,
                },
            };
            tracing::info!("{title}");
            titles.push(title);
        }

        let catalog =
            TitleCatalog::new(titles, TieBreak::FirstMax).with_main_title(disc_info.main_title);
        let title = catalog.select(options.title)?.clone();

        disc.select_title(title.index)?;
        let info = disc.title_info(title.index)?;
        tracing::info!(title = title.index, playlist = info.playlist, "selected title");

        let time_base = options.time_base;
        let duration = rescale(info.duration as i64, DISC_TIME_BASE, time_base);
        let chapters = info
            .chapters
            .iter()
            .map(|c| Chapter {
                index: c.index,
                start: rescale(c.start as i64, DISC_TIME_BASE, time_base),
                end: rescale((c.start + c.duration) as i64, DISC_TIME_BASE, time_base),
                time_base,
            })
            .collect();

        // Stream pids match the transport stream pids
        let languages = info
            .clips
            .first()
            .map(|clip| clip.language_map())
            .unwrap_or_default();

        let tables = demuxer.open(Box::new(BlurayStream::new(disc)))?;

        let programs = tables
            .programs
            .iter()
            .map(|p| Program {
                id: p.id,
                program_num: p.program_num,
                stream_indexes: p.stream_indexes.clone(),
                start_time: p.start_time,
            })
            .collect();

        let streams = tables
            .streams
            .iter()
            .map(|ts| ElementaryStream {
                index: ts.index,
                id: ts.id,
                codec: ts.codec.clone(),
                time_base: ts.time_base,
                start_time: ts.start_time,
                language: u16::try_from(ts.id)
                    .ok()
                    .and_then(|pid| languages.get(&pid).cloned())
                    .or_else(|| ts.language.clone()),
            })
            .collect();

        Ok(Self {
            demuxer,
            catalog,
            title,
            duration,
            time_base,
            chapters,
            metadata,
            programs,
            streams,
        })
    }

    /// Next packet from the transport demuxer, `None` at end of stream.
    pub fn read_packet(&mut self) -> Result<Option<Packet>> {
        self.demuxer.read_packet().inspect_err(|e| {
            tracing::error!(error = %e, "failed to get a packet");
        })
    }
}

impl<T> BlurayDemuxer<T> {
    pub fn catalog(&self) -> &TitleCatalog {
        &self.catalog
    }

    pub fn title(&self) -> &Title {
        &self.title
    }

    /// Duration in the caller's time base.
    pub fn duration(&self) -> i64 {
        self.duration
    }

    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Container metadata (`title` is the disc name).
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    pub fn streams(&self) -> &[ElementaryStream] {
        &self.streams
    }
}
