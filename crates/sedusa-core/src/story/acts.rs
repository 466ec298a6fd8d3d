//! Act timeline: how a session's length is split across narrative phases.

use serde::{Deserialize, Serialize};

/// Share of the session held back for the closing release.
pub const RELEASE_SHARE: f64 = 0.10;
/// No active phase is shorter than this.
pub const MIN_PHASE_S: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Act {
    Trap,
    Revelation,
    Test,
    Interrogation,
    Worship,
    Gaze,
    Claiming,
    Release,
}

impl Act {
    pub fn label(self) -> &'static str {
        match self {
            Act::Trap => "The Trap",
            Act::Revelation => "The Revelation",
            Act::Test => "The Test",
            Act::Interrogation => "The Interrogation",
            Act::Worship => "The Worship",
            Act::Gaze => "The Gaze",
            Act::Claiming => "The Claiming",
            Act::Release => "The Release",
        }
    }

    /// Narrative pool for lines spoken during this act.
    pub fn story_key(self) -> String {
        let bare = self.label().trim_start_matches("The ");
        format!("STORY_{}", bare.to_uppercase())
    }

    /// Key announced when the act begins.
    pub fn opening_key(self) -> String {
        match self {
            Act::Trap => "INVITE".to_string(),
            other => other.story_key(),
        }
    }
}

/// One active phase with its allotted time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActPhase {
    pub act: Act,
    pub allocated_s: f64,
}

fn share_table(length_min: u32) -> &'static [(Act, f64)] {
    const LONG: &[(Act, f64)] = &[
        (Act::Trap, 0.10),
        (Act::Revelation, 0.10),
        (Act::Test, 0.20),
        (Act::Interrogation, 0.15),
        (Act::Worship, 0.15),
        (Act::Gaze, 0.10),
        (Act::Claiming, 0.15),
    ];
    // Long table without the claiming act; normalisation spreads its share.
    const MEDIUM: &[(Act, f64)] = &[
        (Act::Trap, 0.10),
        (Act::Revelation, 0.10),
        (Act::Test, 0.20),
        (Act::Interrogation, 0.15),
        (Act::Worship, 0.15),
        (Act::Gaze, 0.10),
    ];
    const SHORT: &[(Act, f64)] = &[
        (Act::Trap, 0.15),
        (Act::Revelation, 0.20),
        (Act::Test, 0.40),
        (Act::Gaze, 0.20),
    ];

    if length_min >= 60 {
        LONG
    } else if length_min >= 30 {
        MEDIUM
    } else {
        SHORT
    }
}

/// Active phases for a session of `length_min` minutes. The release phase
/// is not included; it runs after the last active phase.
pub fn act_timeline(length_min: u32) -> Vec<ActPhase> {
    let table = share_table(length_min);
    let story_s = length_min as f64 * 60.0 * (1.0 - RELEASE_SHARE);
    let total: f64 = table.iter().map(|(_, pct)| pct).sum();

    table
        .iter()
        .map(|&(act, pct)| ActPhase {
            act,
            allocated_s: (pct / total * story_s).max(MIN_PHASE_S),
        })
        .collect()
}
