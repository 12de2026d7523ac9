//! Title catalog and the "main or longest" selection heuristic.

use crate::time::{format_hms, Rational, DISC_TIME_BASE};
use crate::{Error, Result};

/// Format-specific reference from a title to its playable structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(tag = "format", rename_all = "lowercase"))]
pub enum TitleRef {
    /// DVD title-set number and 1-based title number within that set.
    Dvd { title_set: u8, vts_ttn: u8 },
    /// Blu-ray playlist number (`NNNNN.mpls`).
    Bluray { playlist: u32 },
}

/// A top-level selectable program, read once from the disc index.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Title {
    /// Index in the disc's title table (0-based).
    pub index: u32,
    /// Duration in 90 kHz ticks.
    pub duration: u64,
    /// Number of chapter markers.
    pub chapter_count: u32,
    /// Number of playable sub-units (cells or clips).
    pub unit_count: u32,
    /// Number of camera angles.
    pub angle_count: u32,
    /// Where the title's playable structure lives.
    pub reference: TitleRef,
}

impl Title {
    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration as f64 / crate::time::DISC_CLOCK_HZ as f64
    }
}

impl std::fmt::Display for Title {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.reference {
            TitleRef::Dvd { .. } => write!(
                f,
                "title {:03} : ({}) and {} chapter(s)",
                self.index,
                format_hms(self.duration),
                self.chapter_count
            ),
            TitleRef::Bluray { playlist } => write!(
                f,
                "title {}: {:05}.mpls ({}) with {} chapter(s)",
                self.index,
                playlist,
                format_hms(self.duration),
                self.chapter_count
            ),
        }
    }
}

/// A chapter in the linear stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Chapter {
    /// Chapter index as reported by the disc.
    pub index: u32,
    /// Start time in `time_base` ticks.
    pub start: i64,
    /// End time in `time_base` ticks.
    pub end: i64,
    pub time_base: Rational,
}

impl Chapter {
    /// Chapter in disc-native 90 kHz ticks.
    pub fn native(index: u32, start: u64, end: u64) -> Self {
        Self {
            index,
            start: start as i64,
            end: end as i64,
            time_base: DISC_TIME_BASE,
        }
    }
}

/// How the longest-title scan resolves equal durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    /// `<=` comparison: the last title reaching the maximum wins (DVD).
    LastMax,
    /// `<` comparison: the first title reaching the maximum wins (Blu-ray).
    FirstMax,
}

/// Ordered title list plus the data needed to pick a default.
#[derive(Debug, Clone)]
pub struct TitleCatalog {
    titles: Vec<Title>,
    /// Indices into `titles`, in the order the heuristic scans them.
    candidates: Vec<usize>,
    main_title: Option<u32>,
    tie_break: TieBreak,
    precision: Precision,
}

/// Precision at which the heuristic compares durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Precision {
    Ticks,
    WholeSeconds,
}

impl Precision {
    fn key(self, title: &Title) -> u64 {
        match self {
            Self::Ticks => title.duration,
            Self::WholeSeconds => title.duration / crate::time::DISC_CLOCK_HZ as u64,
        }
    }
}

impl TitleCatalog {
    /// Catalog whose candidates are all titles in index order.
    pub fn new(titles: Vec<Title>, tie_break: TieBreak) -> Self {
        let candidates = (0..titles.len()).collect();
        Self {
            titles,
            candidates,
            main_title: None,
            tie_break,
            precision: Precision::Ticks,
        }
    }

    /// Restrict and reorder the heuristic's scan.
    pub fn with_candidates(mut self, candidates: Vec<usize>) -> Self {
        self.candidates = candidates
            .into_iter()
            .filter(|&i| i < self.titles.len())
            .collect();
        self
    }

    /// Declare the disc's main title.
    pub fn with_main_title(mut self, main_title: Option<u32>) -> Self {
        self.main_title = main_title;
        self
    }

    /// Compare durations at whole-second precision.
    pub fn with_whole_second_key(mut self) -> Self {
        self.precision = Precision::WholeSeconds;
        self
    }

    /// All titles in source index order.
    pub fn enumerate(&self) -> &[Title] {
        &self.titles
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn get(&self, index: u32) -> Option<&Title> {
        self.titles.get(index as usize)
    }

    /// Longest candidate under this catalog's tie-break rule.
    pub fn longest(&self) -> Option<&Title> {
        let mut best: Option<&Title> = None;
        for &i in &self.candidates {
            let title = &self.titles[i];
            let better = match best {
                None => true,
                Some(b) => match self.tie_break {
                    TieBreak::LastMax => self.precision.key(b) <= self.precision.key(title),
                    TieBreak::FirstMax => self.precision.key(b) < self.precision.key(title),
                },
            };
            if better {
                best = Some(title);
            }
        }
        best
    }

    /// Declared main title, if it names a title in the catalog.
    pub fn main_title(&self) -> Option<&Title> {
        let main = self.main_title?;
        let title = self.get(main);
        if title.is_none() {
            tracing::warn!(
                main_title = main,
                titles = self.titles.len(),
                "ignoring out-of-range main title"
            );
        }
        title
    }

    /// Select a title explicitly, or fall back to main-else-longest.
    pub fn select(&self, explicit: Option<u32>) -> Result<&Title> {
        if let Some(id) = explicit {
            return self.get(id).ok_or(Error::OutOfRange {
                what: "title",
                value: id,
                count: self.titles.len() as u32,
            });
        }

        self.main_title()
            .or_else(|| self.longest())
            .ok_or_else(|| Error::not_found("no playable title on disc"))
    }
}
