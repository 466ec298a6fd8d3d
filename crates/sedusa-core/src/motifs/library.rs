//! JSON motif banks.
//!
//! A bank file is a JSON array of records:
//!
//! ```json
//! { "name": "snake_coil",
//!   "pattern": { "type": "combo", "dp": 40, "sp": 55, "rng": 25,
//!                "duration_ms": 6000, "combo": [ { "dp": 20 }, { "dp": 70, "type": "burst" } ] },
//!   "tags": { "dominant_band": "C" } }
//! ```
//!
//! Records are validated one at a time; a bad record is skipped with a
//! warning and does not poison the rest of the bank.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use super::pattern::*;
use super::PatternLookup;
use crate::error::BankError;
use crate::timeline::Band;

#[derive(Debug, Deserialize)]
struct RawMotif {
    name: String,
    pattern: RawPattern,
    #[serde(default)]
    tags: RawTags,
}

#[derive(Debug, Default, Deserialize)]
struct RawTags {
    dominant_band: Option<Band>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPattern {
    #[serde(rename = "type")]
    kind: Option<String>,
    dp: Option<f64>,
    sp: Option<f64>,
    rng: Option<f64>,
    duration_ms: Option<u64>,
    #[serde(default)]
    combo: Vec<RawPattern>,
    burst_on_ms: Option<u32>,
    burst_off_ms: Option<u32>,
    cycles: Option<u32>,
    sp2: Option<f64>,
}

impl RawPattern {
    fn motion(&self) -> Result<Motion, String> {
        match self.kind.as_deref() {
            None | Some("sine") => Ok(Motion::Sine),
            Some("triangle") => Ok(Motion::Triangle),
            Some("hold") => Ok(Motion::Hold),
            Some("burst") => Ok(Motion::Burst {
                on_ms: self.burst_on_ms.unwrap_or(DEFAULT_BURST_MS),
                off_ms: self.burst_off_ms.unwrap_or(DEFAULT_BURST_MS),
            }),
            Some("pulse") => {
                let sp2 = self.sp2.unwrap_or(DEFAULT_PULSE_SP2);
                check_percent("sp2", Some(sp2))?;
                Ok(Motion::Pulse {
                    cycles: self.cycles.unwrap_or(DEFAULT_PULSE_CYCLES),
                    sp2,
                })
            }
            Some(other) => Err(format!("unknown motion type '{other}'")),
        }
    }

    fn sub_segment(&self) -> Result<SubSegment, String> {
        check_percent("dp", self.dp)?;
        check_percent("sp", self.sp)?;
        check_range_mm(self.rng)?;
        check_duration(self.duration_ms)?;
        Ok(SubSegment {
            depth_percent: self.dp,
            speed_percent: self.sp,
            range_mm: self.rng,
            duration_ms: self.duration_ms,
            motion: self.motion()?,
        })
    }
}

fn check_percent(field: &str, value: Option<f64>) -> Result<(), String> {
    match value {
        Some(v) if !(0.0..=100.0).contains(&v) => Err(format!("{field}={v} is outside 0..=100")),
        _ => Ok(()),
    }
}

fn check_range_mm(value: Option<f64>) -> Result<(), String> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(format!("rng={v} must be a non-negative length")),
        _ => Ok(()),
    }
}

fn check_duration(value: Option<u64>) -> Result<(), String> {
    match value {
        Some(0) => Err("duration_ms must be positive".into()),
        _ => Ok(()),
    }
}

impl TryFrom<RawMotif> for PatternDefinition {
    type Error = String;

    fn try_from(raw: RawMotif) -> Result<Self, Self::Error> {
        let p = &raw.pattern;
        check_percent("dp", p.dp)?;
        check_percent("sp", p.sp)?;
        check_range_mm(p.rng)?;
        check_duration(p.duration_ms)?;

        let (kind, motion, combo) = if p.kind.as_deref() == Some("combo") {
            if p.combo.is_empty() {
                return Err("combo pattern has no segments".into());
            }
            let combo = p
                .combo
                .iter()
                .map(RawPattern::sub_segment)
                .collect::<Result<Vec<_>, _>>()?;
            (PatternKind::Combo, Motion::Sine, combo)
        } else {
            (PatternKind::Simple, p.motion()?, Vec::new())
        };

        let def = PatternDefinition {
            name: raw.name,
            kind,
            depth_percent: p.dp.unwrap_or(DEFAULT_DEPTH_PERCENT),
            speed_percent: p.sp.unwrap_or(DEFAULT_SPEED_PERCENT),
            range_mm: p.rng.unwrap_or(DEFAULT_RANGE_MM),
            duration_ms: p.duration_ms.unwrap_or(DEFAULT_DURATION_MS),
            motion,
            combo,
            dominant_band: raw.tags.dominant_band,
        };
        if !def.is_well_formed() {
            return Err("pattern violates definition invariants".into());
        }
        Ok(def)
    }
}

/// Name-keyed pattern store. Names iterate in sorted order.
#[derive(Debug, Clone, Default)]
pub struct MotifLibrary {
    motifs: BTreeMap<String, PatternDefinition>,
}

impl MotifLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_patterns(patterns: impl IntoIterator<Item = PatternDefinition>) -> Self {
        let mut lib = Self::new();
        for p in patterns {
            lib.insert(p);
        }
        lib
    }

    /// Load every bank in order; later banks override earlier names.
    /// Missing or undecodable files are logged and skipped.
    pub fn load(bank_paths: &[PathBuf]) -> Self {
        let mut lib = Self::new();
        for path in bank_paths {
            if let Err(e) = lib.load_bank(path) {
                warn!("skipping motif bank: {e}");
            }
        }
        info!("loaded {} motifs", lib.len());
        lib
    }

    /// Merge a single bank file into the library.
    pub fn load_bank(&mut self, path: &Path) -> Result<usize, BankError> {
        let content = std::fs::read_to_string(path).map_err(|source| BankError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: Vec<serde_json::Value> =
            serde_json::from_str(&content).map_err(|source| BankError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(self.merge_entries(entries, &path.display().to_string()))
    }

    /// Merge bank records from a JSON string. Returns how many were accepted.
    pub fn merge_json(&mut self, json: &str) -> Result<usize, serde_json::Error> {
        let entries: Vec<serde_json::Value> = serde_json::from_str(json)?;
        Ok(self.merge_entries(entries, "<inline>"))
    }

    fn merge_entries(&mut self, entries: Vec<serde_json::Value>, origin: &str) -> usize {
        let mut accepted = 0;
        for (idx, entry) in entries.into_iter().enumerate() {
            let raw: RawMotif = match serde_json::from_value(entry) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("{origin}[{idx}]: unreadable motif record: {e}");
                    continue;
                }
            };
            let name = raw.name.clone();
            match PatternDefinition::try_from(raw) {
                Ok(def) => {
                    self.insert(def);
                    accepted += 1;
                }
                Err(e) => warn!("{origin}[{idx}] '{name}': {e}"),
            }
        }
        accepted
    }

    pub fn insert(&mut self, pattern: PatternDefinition) {
        self.motifs.insert(pattern.name.clone(), pattern);
    }

    pub fn len(&self) -> usize {
        self.motifs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motifs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternDefinition> {
        self.motifs.values()
    }
}

impl PatternLookup for MotifLibrary {
    fn get_pattern(&self, name: &str) -> Option<&PatternDefinition> {
        self.motifs.get(name)
    }

    fn pattern_names(&self) -> Vec<String> {
        self.motifs.keys().cloned().collect()
    }
}
