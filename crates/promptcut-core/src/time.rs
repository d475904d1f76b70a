//! Time representation for the timeline.
//!
//! The editing model works in seconds (`f64`); integer frame numbers only
//! appear at the serialization boundary, converted through a `FrameRate`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Frame rate as a rational number (e.g., 30000/1001 for 29.97 fps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    /// Numerator (e.g., 30000)
    pub numerator: u32,
    /// Denominator (e.g., 1001)
    pub denominator: u32,
}

impl FrameRate {
    /// Create a new frame rate.
    #[inline]
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Convert to frames per second as f64.
    #[inline]
    pub fn to_fps_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Convert a time in seconds to the nearest frame number.
    #[inline]
    pub fn seconds_to_frames(self, seconds: f64) -> i64 {
        (seconds * self.to_fps_f64()).round() as i64
    }

    /// Convert a frame number to seconds.
    #[inline]
    pub fn frames_to_seconds(self, frames: i64) -> f64 {
        frames as f64 / self.to_fps_f64()
    }

    /// Common frame rates
    pub const FPS_23_976: Self = Self::new(24000, 1001);
    pub const FPS_24: Self = Self::new(24, 1);
    pub const FPS_25: Self = Self::new(25, 1);
    pub const FPS_29_97: Self = Self::new(30000, 1001);
    pub const FPS_30: Self = Self::new(30, 1);
    pub const FPS_60: Self = Self::new(60, 1);
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::FPS_30
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fps = self.to_fps_f64();
        if (fps - fps.round()).abs() < 0.001 {
            write!(f, "{} fps", fps.round() as u32)
        } else {
            write!(f, "{:.3} fps", fps)
        }
    }
}

/// A time range in seconds with inclusive start and exclusive end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start time in seconds (inclusive)
    pub start: f64,
    /// End time in seconds (exclusive)
    pub end: f64,
}

impl TimeRange {
    /// Create a new time range from start and end times.
    #[inline]
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Create a time range from start and duration.
    #[inline]
    pub fn from_start_duration(start: f64, duration: f64) -> Self {
        Self {
            start,
            end: start + duration,
        }
    }

    /// Duration of the range in seconds.
    #[inline]
    pub fn duration(self) -> f64 {
        self.end - self.start
    }

    /// Check if a time is within this range.
    #[inline]
    pub fn contains(self, time: f64) -> bool {
        time >= self.start && time < self.end
    }

    /// Check if two half-open ranges overlap: `[a0,a1)` and `[b0,b1)`
    /// overlap iff `a0 < b1 && a1 > b0`.
    #[inline]
    pub fn overlaps(self, other: Self) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Compute the intersection of two ranges, if any.
    pub fn intersection(self, other: Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Self {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }

    /// Empty range starting at zero.
    pub const EMPTY: Self = Self {
        start: 0.0,
        end: 0.0,
    };
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3}s, {:.3}s)", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_conversion_roundtrip() {
        let rate = FrameRate::FPS_30;
        assert_eq!(rate.seconds_to_frames(2.0), 60);
        assert_eq!(rate.frames_to_seconds(60), 2.0);
    }

    #[test]
    fn test_frame_rate_29_97() {
        let rate = FrameRate::FPS_29_97;
        let fps = rate.to_fps_f64();
        assert!((fps - 29.97).abs() < 0.001);
    }

    #[test]
    fn test_range_overlap() {
        let a = TimeRange::new(0.0, 10.0);
        let b = TimeRange::new(5.0, 15.0);
        assert!(a.overlaps(b));

        let intersection = a.intersection(b).unwrap();
        assert_eq!(intersection.start, 5.0);
        assert_eq!(intersection.end, 10.0);
    }

    #[test]
    fn test_adjacent_ranges_do_not_overlap() {
        // Half-open intervals: [0,5) and [5,10) share only the boundary.
        let a = TimeRange::new(0.0, 5.0);
        let b = TimeRange::new(5.0, 10.0);
        assert!(!a.overlaps(b));
        assert!(!b.overlaps(a));
    }

    #[test]
    fn test_contains_is_half_open() {
        let r = TimeRange::new(1.0, 2.0);
        assert!(r.contains(1.0));
        assert!(r.contains(1.999));
        assert!(!r.contains(2.0));
    }
}
