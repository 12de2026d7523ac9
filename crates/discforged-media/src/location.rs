//! Disc location parsing and format probing.

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Probe score for a match by file extension.
pub const PROBE_SCORE_EXTENSION: u32 = 50;

const BLURAY_EXTENSIONS: &[&str] = &["bdmv", "iso"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "lowercase"))]
pub enum DiscFormat {
    Dvd,
    Bluray,
}

impl fmt::Display for DiscFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dvd => write!(f, "DVD-Video"),
            Self::Bluray => write!(f, "Blu-ray"),
        }
    }
}

/// A disc path with its format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscLocation {
    pub format: DiscFormat,
    pub path: PathBuf,
}

impl DiscLocation {
    /// Parse `dvd:PATH`, `bluray:PATH` or a bare path.
    ///
    /// Prefixes match case-insensitively. A bare path is Blu-ray when it
    /// names or contains a `BDMV` directory, DVD otherwise.
    pub fn parse(url: &str) -> Self {
        if let Some(path) = strip_prefix_ignore_case(url, "dvd:") {
            return Self {
                format: DiscFormat::Dvd,
                path: PathBuf::from(path),
            };
        }
        if let Some(path) = strip_prefix_ignore_case(url, "bluray:") {
            return Self {
                format: DiscFormat::Bluray,
                path: PathBuf::from(path),
            };
        }

        let path = PathBuf::from(url);
        let format = if is_bdmv_path(&path) {
            DiscFormat::Bluray
        } else {
            DiscFormat::Dvd
        };
        Self { format, path }
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}

fn is_bdmv_path(path: &Path) -> bool {
    let names_bdmv = path.components().any(|c| match c {
        Component::Normal(name) => name
            .to_str()
            .is_some_and(|n| n.eq_ignore_ascii_case("BDMV")),
        _ => false,
    });
    names_bdmv || path.join("BDMV").is_dir()
}

/// Score how likely `name` is a Blu-ray input for the demuxer.
///
/// Names using the `bluray:` protocol score 0, since the protocol layer
/// handles them.
pub fn probe_score(name: &str) -> u32 {
    if name.to_ascii_lowercase().contains("bluray:") {
        return 0;
    }
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext {
        Some(ext) if BLURAY_EXTENSIONS.contains(&ext.as_str()) => PROBE_SCORE_EXTENSION,
        _ => 0,
    }
}
