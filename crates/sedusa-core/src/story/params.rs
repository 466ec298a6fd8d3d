//! Session request validation.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::drivers::MotionRange;
use crate::error::ValidationError;

pub const MAX_LENGTH_MIN: u32 = 24 * 60;
pub const MAX_NAME_CHARS: usize = 24;

/// Physical limits of the device; requests are clamped into these.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Caps {
    pub depth_min_mm: f64,
    pub depth_max_mm: f64,
    pub speed_min_hz: f64,
    pub speed_max_hz: f64,
}

impl Default for Caps {
    fn default() -> Self {
        Self {
            depth_min_mm: 15.0,
            depth_max_mm: 110.0,
            speed_min_hz: 0.4,
            speed_max_hz: 3.2,
        }
    }
}

/// Raw parameters for starting a session, as a caller supplies them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRequest {
    pub depth_min: f64,
    pub depth_max: f64,
    pub speed_min: f64,
    pub speed_max: f64,
    #[serde(default = "default_length_min")]
    pub length_min: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_length_min() -> u32 {
    10
}

/// Validated, clamped parameters a session runs with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionParams {
    pub depth_min_mm: f64,
    pub depth_max_mm: f64,
    pub speed_min_hz: f64,
    pub speed_max_hz: f64,
    pub length_min: u32,
    pub name: String,
    pub seed: u64,
}

impl SessionParams {
    pub fn motion_range(&self) -> MotionRange {
        MotionRange {
            depth_min_mm: self.depth_min_mm,
            depth_max_mm: self.depth_max_mm,
            speed_min_hz: self.speed_min_hz,
            speed_max_hz: self.speed_max_hz,
        }
    }
}

fn finite(field: &str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("{value} is not a finite number"),
        })
    }
}

/// Clamp `(lo, hi)` into `[cap_lo, cap_hi]` keeping `lo <= hi`.
fn clamp_pair(lo: f64, hi: f64, cap_lo: f64, cap_hi: f64) -> (f64, f64) {
    let lo = lo.min(cap_hi).max(cap_lo);
    let hi = hi.min(cap_hi).max(lo);
    (lo, hi)
}

impl SessionRequest {
    /// Parse a JSON request body.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json).map_err(|e| ValidationError::InvalidValue {
            field: "request".into(),
            message: e.to_string(),
        })
    }

    /// Reject malformed values, clamp to `caps`, and fix the seed.
    pub fn validate(&self, caps: &Caps) -> Result<SessionParams, ValidationError> {
        let depth_min = finite("depth_min", self.depth_min)?;
        let depth_max = finite("depth_max", self.depth_max)?;
        let speed_min = finite("speed_min", self.speed_min)?;
        let speed_max = finite("speed_max", self.speed_max)?;

        if self.length_min == 0 || self.length_min > MAX_LENGTH_MIN {
            return Err(ValidationError::OutOfRange {
                field: "length_min".into(),
                value: self.length_min as f64,
                min: 1.0,
                max: MAX_LENGTH_MIN as f64,
            });
        }

        let (depth_min_mm, depth_max_mm) = clamp_pair(depth_min, depth_max, caps.depth_min_mm, caps.depth_max_mm);
        let (speed_min_hz, speed_max_hz) = clamp_pair(speed_min, speed_max, caps.speed_min_hz, caps.speed_max_hz);

        let name = self
            .name
            .as_deref()
            .unwrap_or_default()
            .trim()
            .chars()
            .take(MAX_NAME_CHARS)
            .collect();
        let seed = self
            .seed
            .unwrap_or_else(|| rand::thread_rng().gen_range(1000..=999_999));

        Ok(SessionParams {
            depth_min_mm,
            depth_max_mm,
            speed_min_hz,
            speed_max_hz,
            length_min: self.length_min,
            name,
            seed,
        })
    }
}
