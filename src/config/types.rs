use discforged_media::bluray::BlurayOptions;
use discforged_media::time::Rational;
use discforged_media::DvdOptions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub dvd: DvdConfig,

    #[serde(default)]
    pub bluray: BlurayConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// DVD open options; explicit `title` and `angle` override the config.
    pub fn dvd_options(&self, title: Option<u32>, angle: Option<u32>) -> DvdOptions {
        DvdOptions {
            title: title.or(self.dvd.title),
            angle: angle.unwrap_or(self.dvd.angle),
            time_base: self.output.time_base(),
            buffer_sectors: self.output.buffer_sectors,
        }
    }

    /// Blu-ray open options; an explicit `title` overrides the config.
    pub fn bluray_options(&self, title: Option<u32>) -> BlurayOptions {
        BlurayOptions {
            title: title.or(self.bluray.title),
            min_title_length: self.bluray.min_title_length,
            time_base: self.output.time_base(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DvdConfig {
    /// Title to open; the longest title when unset
    #[serde(default)]
    pub title: Option<u32>,

    /// Camera angle, 0 for the first
    #[serde(default)]
    pub angle: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlurayConfig {
    /// Title to open; the main or longest title when unset
    #[serde(default)]
    pub title: Option<u32>,

    /// Shortest title, in seconds, listed by the disc library
    #[serde(default = "default_min_title_length")]
    pub min_title_length: u32,
}

impl Default for BlurayConfig {
    fn default() -> Self {
        Self {
            title: None,
            min_title_length: default_min_title_length(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Durations and chapter times are reported in 1/time_base_den seconds
    #[serde(default = "default_time_base_den")]
    pub time_base_den: u32,

    /// Stream read buffer size, in 2048-byte sectors
    #[serde(default = "default_buffer_sectors")]
    pub buffer_sectors: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            time_base_den: default_time_base_den(),
            buffer_sectors: default_buffer_sectors(),
        }
    }
}

impl OutputConfig {
    pub fn time_base(&self) -> Rational {
        Rational::new(1, self.time_base_den as i64)
    }
}

pub const MAX_DVD_TITLE: u32 = 9999;
pub const MAX_DVD_ANGLE: u32 = 256;
pub const MAX_BLURAY_TITLE: u32 = 99999;
pub const MIN_TITLE_LENGTH_RANGE: std::ops::RangeInclusive<u32> = 180..=99999;

fn default_min_title_length() -> u32 {
    discforged_media::bluray::MIN_TITLE_LENGTH
}

fn default_time_base_den() -> u32 {
    1_000_000
}

fn default_buffer_sectors() -> usize {
    discforged_media::dvd::DEFAULT_BUFFER_SECTORS
}
