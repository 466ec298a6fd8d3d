//! Pattern definition to timed segments.
//!
//! Combo patterns are spread so that consecutive entries overlap by a
//! fraction of their own length:
//!
//! ```text
//! d    = T / (N - overlap * (N - 1))
//! step = d * (1 - overlap)
//! |---- 0 ----|
//!         |---- 1 ----|
//!                 |---- 2 ----|
//! ```
//!
//! Overlap only widens the windows; the tick loop still drives one segment
//! at a time.

use super::segment::{speed_percent_to_hz, Segment};
use super::Band;
use crate::motifs::{PatternDefinition, PatternKind, PatternLookup};

pub const DEFAULT_OVERLAP: f64 = 0.3;

/// Look up and compile a pattern. Never fails: an unknown or malformed
/// pattern yields a single silent segment.
pub fn compile_by_name<L: PatternLookup + ?Sized>(lookup: &L, name: &str, overlap: f64) -> Vec<Segment> {
    match lookup.get_pattern(name) {
        Some(pattern) => compile_pattern(pattern, overlap),
        None => vec![Segment::silent()],
    }
}

pub fn compile_pattern(pattern: &PatternDefinition, overlap: f64) -> Vec<Segment> {
    if !pattern.is_well_formed() {
        return vec![Segment::silent()];
    }

    match pattern.kind {
        PatternKind::Simple => vec![Segment {
            band: pattern.band(),
            hz: speed_percent_to_hz(pattern.speed_percent),
            range_mm: pattern.range_mm,
            offset_s: 0.0,
            duration_s: pattern.duration_ms as f64 / 1000.0,
            motion: pattern.motion,
            dominant_band: pattern.dominant_band,
        }],
        PatternKind::Combo => compile_combo(pattern, overlap),
    }
}

fn compile_combo(pattern: &PatternDefinition, overlap: f64) -> Vec<Segment> {
    let overlap = if overlap.is_finite() { overlap.clamp(0.0, 0.95) } else { 0.0 };
    let total_s = pattern.duration_ms as f64 / 1000.0;
    let n = pattern.combo.len();

    let seg_s = if n > 1 {
        total_s / (n as f64 - overlap * (n as f64 - 1.0))
    } else {
        total_s
    };
    let step = seg_s * (1.0 - overlap);

    pattern
        .combo
        .iter()
        .enumerate()
        .map(|(i, sub)| {
            let depth = sub.depth_percent.unwrap_or(pattern.depth_percent);
            let speed = sub.speed_percent.unwrap_or(pattern.speed_percent);
            Segment {
                band: Band::from_depth(depth),
                hz: speed_percent_to_hz(speed),
                range_mm: sub.range_mm.unwrap_or(pattern.range_mm),
                offset_s: i as f64 * step,
                duration_s: sub
                    .duration_ms
                    .map(|ms| ms as f64 / 1000.0)
                    .unwrap_or(seg_s),
                motion: sub.motion,
                dominant_band: pattern.dominant_band,
            }
        })
        .collect()
}
