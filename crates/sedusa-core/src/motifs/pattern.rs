//! Typed motif definitions.
//!
//! A [`PatternDefinition`] is immutable once loaded. Type-specific fields
//! live on the [`Motion`] variant that needs them.

use serde::{Deserialize, Serialize};

use crate::timeline::Band;

pub const DEFAULT_DEPTH_PERCENT: f64 = 50.0;
pub const DEFAULT_SPEED_PERCENT: f64 = 50.0;
pub const DEFAULT_RANGE_MM: f64 = 20.0;
pub const DEFAULT_DURATION_MS: u64 = 5000;
pub const DEFAULT_BURST_MS: u32 = 200;
pub const DEFAULT_PULSE_CYCLES: u32 = 4;
pub const DEFAULT_PULSE_SP2: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Simple,
    Combo,
}

/// Motion shape of a single segment, with the fields only that shape reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Motion {
    Sine,
    Triangle,
    Hold,
    /// Square-wave on/off duty cycle.
    Burst { on_ms: u32, off_ms: u32 },
    /// `cycles` sub-cycles alternating between the segment speed and `sp2`.
    Pulse { cycles: u32, sp2: f64 },
}

impl Default for Motion {
    fn default() -> Self {
        Motion::Sine
    }
}

impl Motion {
    pub fn name(&self) -> &'static str {
        match self {
            Motion::Sine => "sine",
            Motion::Triangle => "triangle",
            Motion::Hold => "hold",
            Motion::Burst { .. } => "burst",
            Motion::Pulse { .. } => "pulse",
        }
    }
}

/// Per-entry overrides inside a combo pattern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubSegment {
    pub depth_percent: Option<f64>,
    pub speed_percent: Option<f64>,
    pub range_mm: Option<f64>,
    pub duration_ms: Option<u64>,
    pub motion: Motion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternDefinition {
    pub name: String,
    pub kind: PatternKind,
    pub depth_percent: f64,
    pub speed_percent: f64,
    pub range_mm: f64,
    pub duration_ms: u64,
    /// Shape used by simple patterns.
    pub motion: Motion,
    pub combo: Vec<SubSegment>,
    pub dominant_band: Option<Band>,
}

impl PatternDefinition {
    /// A simple pattern with default shape.
    pub fn simple(name: impl Into<String>, depth_percent: f64, speed_percent: f64, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            kind: PatternKind::Simple,
            depth_percent,
            speed_percent,
            range_mm: DEFAULT_RANGE_MM,
            duration_ms,
            motion: Motion::Sine,
            combo: Vec::new(),
            dominant_band: None,
        }
    }

    /// A combo pattern over the given sub-segments.
    pub fn combo(name: impl Into<String>, duration_ms: u64, combo: Vec<SubSegment>) -> Self {
        Self {
            name: name.into(),
            kind: PatternKind::Combo,
            depth_percent: DEFAULT_DEPTH_PERCENT,
            speed_percent: DEFAULT_SPEED_PERCENT,
            range_mm: DEFAULT_RANGE_MM,
            duration_ms,
            motion: Motion::Sine,
            combo,
            dominant_band: None,
        }
    }

    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = motion;
        self
    }

    pub fn with_range(mut self, range_mm: f64) -> Self {
        self.range_mm = range_mm;
        self
    }

    pub fn with_dominant_band(mut self, band: Band) -> Self {
        self.dominant_band = Some(band);
        self
    }

    pub fn band(&self) -> Band {
        Band::from_depth(self.depth_percent)
    }

    /// Checks the invariants the compiler relies on. Every compiled segment
    /// must end up with a positive duration.
    pub fn is_well_formed(&self) -> bool {
        if !in_percent_range(self.depth_percent) || !in_percent_range(self.speed_percent) {
            return false;
        }
        if !valid_range_mm(self.range_mm) || self.duration_ms == 0 {
            return false;
        }
        match self.kind {
            PatternKind::Simple => true,
            PatternKind::Combo => !self.combo.is_empty() && self.combo.iter().all(SubSegment::is_well_formed),
        }
    }
}

impl SubSegment {
    pub fn is_well_formed(&self) -> bool {
        self.depth_percent.map_or(true, in_percent_range)
            && self.speed_percent.map_or(true, in_percent_range)
            && self.range_mm.map_or(true, valid_range_mm)
            && self.duration_ms != Some(0)
    }
}

fn in_percent_range(v: f64) -> bool {
    (0.0..=100.0).contains(&v)
}

fn valid_range_mm(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}
