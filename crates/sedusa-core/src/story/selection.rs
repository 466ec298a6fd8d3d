//! Contrast-seeking pattern selection.
//!
//! After the first pick of a playlist, the next pattern is drawn from those
//! that land in a different band or move the depth by more than
//! [`CONTRAST_DEPTH_DELTA`]. Only when nothing contrasts does selection fall
//! back to "any other name", and only a one-pattern universe repeats.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::motifs::PatternLookup;
use crate::motifs::pattern::DEFAULT_DEPTH_PERCENT;
use crate::timeline::Band;

pub const CONTRAST_DEPTH_DELTA: f64 = 30.0;

#[derive(Debug, Clone, PartialEq)]
pub struct LastPick {
    pub name: String,
    pub depth_percent: f64,
    pub band: Band,
}

impl LastPick {
    pub fn of<L: PatternLookup + ?Sized>(lookup: &L, name: &str) -> Self {
        let depth_percent = lookup
            .get_pattern(name)
            .map(|p| p.depth_percent)
            .unwrap_or(DEFAULT_DEPTH_PERCENT);
        Self {
            name: name.to_string(),
            depth_percent,
            band: Band::from_depth(depth_percent),
        }
    }
}

/// Pick the next pattern name, or `None` if `names` is empty.
pub fn pick_next<L, R>(lookup: &L, names: &[String], last: Option<&LastPick>, rng: &mut R) -> Option<String>
where
    L: PatternLookup + ?Sized,
    R: Rng,
{
    let Some(last) = last else {
        return names.choose(rng).cloned();
    };

    let contrasting: Vec<&String> = names
        .iter()
        .filter(|name| {
            lookup.get_pattern(name).is_some_and(|p| {
                p.band() != last.band || (p.depth_percent - last.depth_percent).abs() > CONTRAST_DEPTH_DELTA
            })
        })
        .collect();
    if let Some(name) = contrasting.choose(rng) {
        return Some((*name).clone());
    }

    let others: Vec<&String> = names.iter().filter(|name| **name != last.name).collect();
    if let Some(name) = others.choose(rng) {
        return Some((*name).clone());
    }

    names.choose(rng).cloned()
}
