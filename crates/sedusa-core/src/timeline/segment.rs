use serde::{Deserialize, Serialize};

use super::Band;
use crate::motifs::Motion;

/// Percent-to-Hz scale: 100% speed is 3.0 Hz.
pub const HZ_AT_FULL_SPEED: f64 = 3.0;

/// One compiled, timed actuation instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub band: Band,
    pub hz: f64,
    pub range_mm: f64,
    pub offset_s: f64,
    pub duration_s: f64,
    #[serde(flatten)]
    pub motion: Motion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominant_band: Option<Band>,
}

impl Segment {
    /// The silent stand-in used when a pattern cannot be compiled.
    pub fn silent() -> Self {
        Self {
            band: Band::B,
            hz: 0.0,
            range_mm: 0.0,
            offset_s: 0.0,
            duration_s: 1.0,
            motion: Motion::Sine,
            dominant_band: None,
        }
    }

    pub fn end_s(&self) -> f64 {
        self.offset_s + self.duration_s
    }

    /// Whether `t` falls inside `[offset_s, offset_s + duration_s)`.
    pub fn is_active_at(&self, t: f64) -> bool {
        self.offset_s <= t && t < self.end_s()
    }

    /// Whether this segment sits in the band its pattern marks as dominant.
    pub fn in_dominant_band(&self) -> bool {
        self.dominant_band == Some(self.band)
    }
}

pub fn speed_percent_to_hz(speed_percent: f64) -> f64 {
    speed_percent / 100.0 * HZ_AT_FULL_SPEED
}

/// Total span of a compiled list: the latest segment end.
pub fn span(segments: &[Segment]) -> f64 {
    segments.iter().map(Segment::end_s).fold(0.0, f64::max)
}
