//! Time bases and disc-native time representations.

/// Disc-native clock rate (MPEG system clock / 300).
pub const DISC_CLOCK_HZ: u32 = 90_000;

/// Time base of disc-native timestamps (1/90000 s).
pub const DISC_TIME_BASE: Rational = Rational::new(1, DISC_CLOCK_HZ as i64);

/// Microsecond time base, the default caller time base.
pub const MICROS_TIME_BASE: Rational = Rational::new(1, 1_000_000);

/// A rational time base (`num / den` seconds per tick).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Rational {
    pub num: i64,
    pub den: i64,
}

impl Rational {
    pub const fn new(num: i64, den: i64) -> Self {
        Self { num, den }
    }
}

impl std::fmt::Display for Rational {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Convert `value` ticks of `from` into ticks of `to`.
///
/// Rounds to nearest, ties away from zero. Intermediates are 128-bit so
/// 90 kHz timestamps of any realistic length never overflow.
pub fn rescale(value: i64, from: Rational, to: Rational) -> i64 {
    let num = value as i128 * from.num as i128 * to.den as i128;
    let den = from.den as i128 * to.num as i128;
    if den == 0 {
        return 0;
    }
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    let half = den / 2;
    let q = if num >= 0 {
        (num + half) / den
    } else {
        (num - half) / den
    };
    q.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Decode one packed BCD byte.
///
/// Nibbles above 9 are decoded arithmetically rather than rejected.
pub fn bcd_to_int(bcd: u8) -> u32 {
    ((bcd & 0xf0) >> 4) as u32 * 10 + (bcd & 0x0f) as u32
}

/// DVD playback time: BCD hours, minutes, seconds and a frame byte whose
/// top two bits select the frame rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DvdTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub frame_u: u8,
}

impl DvdTime {
    /// Parse the 4-byte on-disc layout.
    pub fn from_bytes(b: [u8; 4]) -> Self {
        Self {
            hour: b[0],
            minute: b[1],
            second: b[2],
            frame_u: b[3],
        }
    }

    /// Whole seconds (frames ignored).
    pub fn whole_seconds(&self) -> u64 {
        bcd_to_int(self.hour) as u64 * 3600
            + bcd_to_int(self.minute) as u64 * 60
            + bcd_to_int(self.second) as u64
    }

    /// Whole-second duration in milliseconds.
    pub fn millis(&self) -> u64 {
        self.whole_seconds() * 1000
    }

    /// Frame rate as `(num, den)` frames per second, if encoded.
    pub fn frame_rate(&self) -> Option<(u64, u64)> {
        match self.frame_u >> 6 {
            0b01 => Some((25, 1)),
            0b11 => Some((30000, 1001)),
            _ => None,
        }
    }

    /// Frame-accurate duration in 90 kHz ticks.
    pub fn ticks(&self) -> u64 {
        let base = self.whole_seconds() * DISC_CLOCK_HZ as u64;
        let frames = bcd_to_int(self.frame_u & 0x3f) as u64;
        match self.frame_rate() {
            Some((num, den)) => base + frames * DISC_CLOCK_HZ as u64 * den / num,
            None => base,
        }
    }
}

/// Format 90 kHz ticks as `h:mm:ss`.
pub fn format_hms(ticks: u64) -> String {
    let secs = ticks / DISC_CLOCK_HZ as u64;
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcd_decode() {
        assert_eq!(bcd_to_int(0x59), 59);
        assert_eq!(bcd_to_int(0x00), 0);
        // Invalid nibble is decoded arithmetically
        assert_eq!(bcd_to_int(0x1a), 20);
    }

    #[test]
    fn test_dvd_time_whole_seconds() {
        let t = DvdTime::from_bytes([0x01, 0x30, 0x15, 0x40]);
        assert_eq!(t.whole_seconds(), 3600 + 30 * 60 + 15);
        assert_eq!(t.millis(), 5_415_000);
    }

    #[test]
    fn test_dvd_time_frames_pal() {
        // 25 fps, 12 frames = 0.48 s
        let t = DvdTime::from_bytes([0x00, 0x00, 0x02, 0x40 | 0x12]);
        assert_eq!(t.ticks(), 2 * 90_000 + 12 * 3600);
    }

    #[test]
    fn test_dvd_time_frames_ntsc() {
        // 29.97 fps, one frame = 3003 ticks
        let t = DvdTime::from_bytes([0x00, 0x00, 0x00, 0xc0 | 0x01]);
        assert_eq!(t.ticks(), 3003);
    }

    #[test]
    fn test_dvd_time_unknown_rate_drops_frames() {
        let t = DvdTime::from_bytes([0x00, 0x01, 0x00, 0x05]);
        assert_eq!(t.ticks(), 60 * 90_000);
    }

    #[test]
    fn test_rescale_90k_to_micros() {
        assert_eq!(rescale(90_000, DISC_TIME_BASE, MICROS_TIME_BASE), 1_000_000);
        assert_eq!(rescale(3003, DISC_TIME_BASE, MICROS_TIME_BASE), 33_367);
    }

    #[test]
    fn test_rescale_rounds_half_away_from_zero() {
        let from = Rational::new(1, 2);
        let to = Rational::new(1, 1);
        assert_eq!(rescale(1, from, to), 1);
        assert_eq!(rescale(-1, from, to), -1);
        assert_eq!(rescale(2, from, to), 1);
    }

    #[test]
    fn test_rescale_large_value_no_overflow() {
        let ten_hours = 10 * 3600 * 90_000i64;
        let ns = Rational::new(1, 1_000_000_000);
        assert_eq!(
            rescale(ten_hours, DISC_TIME_BASE, ns),
            10 * 3600 * 1_000_000_000
        );
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(90_000 * 3725), "1:02:05");
        assert_eq!(format_hms(0), "0:00:00");
    }
}
