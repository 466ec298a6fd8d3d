use sedusa_core::{compile_by_name, Config, PatternLookup};
use tracing::warn;

use super::{load_content, print_json, CliResult};

pub fn run(pattern: &str, overlap: f64) -> CliResult {
    let config = Config::load()?;
    let (library, _) = load_content(&config)?;
    if library.get_pattern(pattern).is_none() {
        warn!("unknown pattern '{pattern}', compiled as silence");
    }
    print_json(&compile_by_name(&library, pattern, overlap))
}
