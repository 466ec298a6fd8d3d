use sedusa_core::story::acts::RELEASE_SHARE;
use sedusa_core::{act_timeline, ActPhase};
use serde::Serialize;

use super::{print_json, CliResult};

#[derive(Serialize)]
struct TimelineOutput {
    length_min: u32,
    phases: Vec<ActPhase>,
    release_s: f64,
}

pub fn run(length_min: u32) -> CliResult {
    if length_min == 0 {
        return Err("length must be at least 1 minute".into());
    }
    print_json(&TimelineOutput {
        length_min,
        phases: act_timeline(length_min),
        release_s: length_min as f64 * 60.0 * RELEASE_SHARE,
    })
}
