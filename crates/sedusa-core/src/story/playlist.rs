//! Per-phase playlist construction.

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use super::selection::{pick_next, LastPick};
use crate::motifs::PatternLookup;
use crate::timeline::{compile_by_name, span, Segment, DEFAULT_OVERLAP};

/// Fraction of each pattern that overlaps the next one in a playlist.
pub const PLAYLIST_OVERLAP: f64 = 0.4;
/// Compiled patterns at or below this length are discarded.
pub const MIN_PATTERN_S: f64 = 0.1;
/// Consecutive discards tolerated before giving up on the phase.
const MAX_DISCARDS: usize = 64;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Playlist {
    /// Ordered by `offset_s`.
    pub segments: Vec<Segment>,
    /// Pattern names in the order they were chosen.
    pub picks: Vec<String>,
    /// Running length with inter-pattern overlap applied.
    pub duration_s: f64,
}

impl Playlist {
    /// Wall-clock length of playback: the latest segment end.
    pub fn span_s(&self) -> f64 {
        span(&self.segments)
    }
}

/// Fill a playlist to `target_s`, checking `keep_going` before each pick.
pub fn build_playlist<L, R>(
    lookup: &L,
    names: &[String],
    target_s: f64,
    rng: &mut R,
    mut keep_going: impl FnMut() -> bool,
) -> Playlist
where
    L: PatternLookup + ?Sized,
    R: Rng,
{
    let mut playlist = Playlist::default();
    let mut last: Option<LastPick> = None;
    let mut discards = 0;

    while playlist.duration_s < target_s && keep_going() {
        let Some(name) = pick_next(lookup, names, last.as_ref(), rng) else {
            break;
        };
        let compiled = compile_by_name(lookup, &name, DEFAULT_OVERLAP);
        last = Some(LastPick::of(lookup, &name));

        let length = span(&compiled);
        if length <= MIN_PATTERN_S {
            discards += 1;
            if discards >= MAX_DISCARDS {
                debug!("giving up on playlist after {discards} unusable patterns");
                break;
            }
            continue;
        }
        discards = 0;

        let shift = playlist.duration_s;
        playlist.segments.extend(compiled.into_iter().map(|mut seg| {
            seg.offset_s += shift;
            seg
        }));
        playlist.duration_s += length * (1.0 - PLAYLIST_OVERLAP);
        playlist.picks.push(name);
    }

    playlist
        .segments
        .sort_by(|a, b| a.offset_s.total_cmp(&b.offset_s));
    playlist
}
