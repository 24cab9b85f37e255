//! Media properties of source videos.

use std::cmp::Ordering;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A frame rate kept as the rational ffprobe reports (e.g. `30000/1001`).
///
/// Ordering and equality compare the rational value, so `60/2 == 30/1`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FrameRate {
    pub num: u32,
    pub den: u32,
}

impl FrameRate {
    /// Create a frame rate. Returns `None` for a zero numerator or denominator.
    pub fn new(num: u32, den: u32) -> Option<Self> {
        if num == 0 || den == 0 {
            return None;
        }
        Some(Self { num, den })
    }

    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl PartialEq for FrameRate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrameRate {}

impl PartialOrd for FrameRate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrameRate {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.num as u64 * other.den as u64;
        let rhs = other.num as u64 * self.den as u64;
        lhs.cmp(&rhs)
    }
}

impl std::fmt::Display for FrameRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl FromStr for FrameRate {
    type Err = String;

    /// Accepts `num/den`, an integer, or a decimal (`29.97` becomes `2997/100`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || format!("invalid frame rate '{}'", s);

        if let Some((num, den)) = s.split_once('/') {
            let num: u32 = num.trim().parse().map_err(|_| invalid())?;
            let den: u32 = den.trim().parse().map_err(|_| invalid())?;
            return FrameRate::new(num, den).ok_or_else(invalid);
        }

        if let Some((whole, frac)) = s.split_once('.') {
            let frac = frac.trim_end_matches('0');
            if frac.len() > 6 || !frac.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            let den = 10u32.pow(frac.len() as u32);
            let whole: u32 = if whole.is_empty() {
                0
            } else {
                whole.parse().map_err(|_| invalid())?
            };
            let frac_val: u32 = if frac.is_empty() { 0 } else { frac.parse().map_err(|_| invalid())? };
            let num = whole
                .checked_mul(den)
                .and_then(|n| n.checked_add(frac_val))
                .ok_or_else(invalid)?;
            return FrameRate::new(num, den).ok_or_else(invalid);
        }

        let num: u32 = s.parse().map_err(|_| invalid())?;
        FrameRate::new(num, 1).ok_or_else(invalid)
    }
}

/// Pixel dimensions of a video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Size assumed when a resolution cannot be probed.
    pub const FALLBACK: Resolution = Resolution {
        width: 800,
        height: 600,
    };

    /// Dimensions rounded down to even values, as the scale step produces.
    pub fn even(&self) -> Resolution {
        Resolution {
            width: self.width / 2 * 2,
            height: self.height / 2 * 2,
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Probed properties of one source video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub path: PathBuf,
    /// Container duration in seconds.
    pub duration_secs: f64,
    /// Frame rate of the first video stream.
    pub frame_rate: FrameRate,
    /// Dimensions of the first video stream, if reported.
    pub resolution: Option<Resolution>,
    /// Whether the file carries at least one audio stream.
    pub has_audio: bool,
}

impl VideoInfo {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rational_and_plain_rates() {
        let ntsc: FrameRate = "30000/1001".parse().unwrap();
        assert_eq!((ntsc.num, ntsc.den), (30000, 1001));
        assert_eq!("25".parse::<FrameRate>().unwrap(), FrameRate::new(25, 1).unwrap());
        assert_eq!("29.97".parse::<FrameRate>().unwrap(), FrameRate::new(2997, 100).unwrap());
        assert_eq!("24.0".parse::<FrameRate>().unwrap(), FrameRate::new(24, 1).unwrap());
    }

    #[test]
    fn rejects_degenerate_rates() {
        assert!("0/0".parse::<FrameRate>().is_err());
        assert!("30/0".parse::<FrameRate>().is_err());
        assert!("abc".parse::<FrameRate>().is_err());
    }

    #[test]
    fn compares_by_value() {
        let a = FrameRate::new(60, 2).unwrap();
        let b = FrameRate::new(30, 1).unwrap();
        let ntsc = FrameRate::new(30000, 1001).unwrap();
        assert_eq!(a, b);
        assert!(ntsc < b);
        assert_eq!(b.to_string(), "30");
        assert_eq!(ntsc.to_string(), "30000/1001");
    }

    #[test]
    fn even_resolution_rounds_down() {
        let r = Resolution { width: 1281, height: 721 };
        assert_eq!(r.even(), Resolution { width: 1280, height: 720 });
    }
}
