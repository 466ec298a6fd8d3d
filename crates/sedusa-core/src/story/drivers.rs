//! Per-tick actuation: pick a live segment and turn it into a command.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::motifs::Motion;
use crate::timeline::{speed_percent_to_hz, Band, Segment, HZ_AT_FULL_SPEED};

/// Max relative jitter applied to speed and range.
pub const JITTER_FACTOR: f64 = 0.20;
/// Chance per tick of a one-tick hesitation on continuous motions.
pub const SLIP_CHANCE: f64 = 0.05;
/// Max +/- jitter on burst and pulse timing.
pub const TIMING_JITTER_MS: f64 = 30.0;
/// Floor for a jittered burst on/off phase.
pub const MIN_BURST_PHASE_MS: f64 = 50.0;
/// Probability of driving a dominant-band segment when one is live.
pub const DOMINANT_WEIGHT: f64 = 0.8;

/// Caller-configured physical limits for one session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionRange {
    pub depth_min_mm: f64,
    pub depth_max_mm: f64,
    pub speed_min_hz: f64,
    pub speed_max_hz: f64,
}

impl MotionRange {
    /// Map a pattern frequency onto the session's speed range.
    pub fn scale_hz(&self, hz: f64) -> f64 {
        let normalized = (hz / HZ_AT_FULL_SPEED).clamp(0.0, 1.0);
        self.speed_min_hz + (self.speed_max_hz - self.speed_min_hz) * normalized
    }

    /// Physical window for a band, centred in its third of the usable span.
    pub fn band_window(&self, band: Band, range_mm: f64) -> (f64, f64) {
        let lo = self.depth_min_mm;
        let hi = self.depth_max_mm;
        let third = (hi - lo).max(8.0) / 3.0;
        let center = lo + third * band.center_thirds();
        let half = range_mm.min(third * 0.9).max(4.0) / 2.0;
        let clip = |v: f64| v.max(lo).min(hi);
        (clip(center - half), clip(center + half))
    }
}

/// One tick's worth of device commands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveCommand {
    pub min_mm: f64,
    pub max_mm: f64,
    pub speed_hz: f64,
}

/// Choose which live segment drives this tick.
///
/// When a live segment carries a dominant-band tag, segments sitting in
/// their dominant band win [`DOMINANT_WEIGHT`] of the time.
pub fn choose_active<'a, R: Rng>(segments: &'a [Segment], t: f64, rng: &mut R) -> Option<&'a Segment> {
    let active: Vec<&Segment> = segments.iter().filter(|s| s.is_active_at(t)).collect();
    if active.is_empty() {
        return None;
    }
    if !active.iter().any(|s| s.dominant_band.is_some()) {
        return active.choose(rng).copied();
    }

    let (dominant, rest): (Vec<&Segment>, Vec<&Segment>) =
        active.iter().copied().partition(|s| s.in_dominant_band());
    if dominant.is_empty() {
        return active.choose(rng).copied();
    }
    if rest.is_empty() || rng.gen_bool(DOMINANT_WEIGHT) {
        dominant.choose(rng).copied()
    } else {
        rest.choose(rng).copied()
    }
}

/// Turn a segment into a command for the current tick.
pub fn drive<R: Rng>(seg: &Segment, elapsed_in_seg: f64, jitter: bool, range: &MotionRange, rng: &mut R) -> DriveCommand {
    match seg.motion {
        Motion::Burst { on_ms, off_ms } => drive_burst(seg, on_ms, off_ms, elapsed_in_seg, range, rng),
        Motion::Pulse { cycles, sp2 } => drive_pulse(seg, cycles, sp2, elapsed_in_seg, range, rng),
        Motion::Sine | Motion::Triangle | Motion::Hold => drive_continuous(seg, jitter, range, rng),
    }
}

fn command(range: &MotionRange, band: Band, range_mm: f64, hz: f64) -> DriveCommand {
    let (min_mm, max_mm) = range.band_window(band, range_mm);
    DriveCommand {
        min_mm,
        max_mm,
        speed_hz: range.scale_hz(hz),
    }
}

fn drive_continuous<R: Rng>(seg: &Segment, jitter: bool, range: &MotionRange, rng: &mut R) -> DriveCommand {
    let mut hz = seg.hz;
    let mut mm = seg.range_mm;
    if jitter {
        hz *= rng.gen_range(1.0 - JITTER_FACTOR..=1.0 + JITTER_FACTOR);
        mm *= rng.gen_range(1.0 - JITTER_FACTOR..=1.0 + JITTER_FACTOR);
        if rng.gen_bool(SLIP_CHANCE) {
            hz = 0.0;
        }
    }
    command(range, seg.band, mm, hz)
}

fn timing_jitter_ms<R: Rng>(rng: &mut R) -> f64 {
    rng.gen_range(-TIMING_JITTER_MS..=TIMING_JITTER_MS)
}

fn drive_burst<R: Rng>(
    seg: &Segment,
    on_ms: u32,
    off_ms: u32,
    elapsed: f64,
    range: &MotionRange,
    rng: &mut R,
) -> DriveCommand {
    let on_s = (on_ms as f64 + timing_jitter_ms(rng)).max(MIN_BURST_PHASE_MS) / 1000.0;
    let off_s = (off_ms as f64 + timing_jitter_ms(rng)).max(MIN_BURST_PHASE_MS) / 1000.0;
    let phase = elapsed.rem_euclid(on_s + off_s);
    let hz = if phase < on_s { seg.hz } else { 0.0 };
    command(range, seg.band, seg.range_mm, hz)
}

fn drive_pulse<R: Rng>(
    seg: &Segment,
    cycles: u32,
    sp2: f64,
    elapsed: f64,
    range: &MotionRange,
    rng: &mut R,
) -> DriveCommand {
    let base = if cycles > 0 {
        seg.duration_s / cycles as f64
    } else {
        seg.duration_s
    };
    let cycle_s = (base + timing_jitter_ms(rng) / 1000.0).max(0.1);
    let phase = elapsed.rem_euclid(cycle_s) / cycle_s;
    let hz = if phase < 0.5 { seg.hz } else { speed_percent_to_hz(sp2) };
    command(range, seg.band, seg.range_mm, hz)
}
