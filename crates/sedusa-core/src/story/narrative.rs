//! Narrative line pools.

use std::collections::HashMap;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::BankError;

pub const OUTRO_KEY: &str = "OUTRO";

/// Announcement key to candidate lines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Narrative {
    pools: HashMap<String, Vec<String>>,
}

impl Narrative {
    pub fn new(pools: HashMap<String, Vec<String>>) -> Self {
        Self { pools }
    }

    pub fn load(path: &Path) -> Result<Self, BankError> {
        let content = std::fs::read_to_string(path).map_err(|source| BankError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| BankError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Whether `key` has at least one line.
    pub fn has_pool(&self, key: &str) -> bool {
        self.pools.get(key).is_some_and(|lines| !lines.is_empty())
    }

    /// Pick a line for `key`, with any trailing bracketed cue removed.
    /// Unknown keys produce a placeholder instead of failing.
    pub fn pick<R: Rng + ?Sized>(&self, key: &str, rng: &mut R) -> String {
        match self.pools.get(key).and_then(|lines| lines.choose(rng)) {
            Some(line) => strip_cue(line).to_string(),
            None => format!("Narrative key not found: {key}"),
        }
    }
}

/// Drop a trailing `[...]` stage cue, e.g. `"Closer. [whisper]"` -> `"Closer."`.
pub fn strip_cue(line: &str) -> &str {
    let trimmed = line.trim_end();
    if trimmed.ends_with(']') {
        if let Some(open) = trimmed.rfind('[') {
            return trimmed[..open].trim_end();
        }
    }
    trimmed
}
