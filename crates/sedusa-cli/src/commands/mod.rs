pub mod compile;
pub mod config;
pub mod patterns;
pub mod run;
pub mod timeline;

use sedusa_core::storage::data_dir;
use sedusa_core::{Config, MotifLibrary, Narrative, Result};
use tracing::warn;

pub type CliResult = std::result::Result<(), Box<dyn std::error::Error>>;

/// Load the configured motif banks and narrative. Missing content is
/// logged and replaced with empty stores.
pub fn load_content(config: &Config) -> Result<(MotifLibrary, Narrative)> {
    let base = data_dir()?;
    let library = MotifLibrary::load(&config.motif_bank_paths(&base));
    if library.is_empty() {
        warn!("no motifs loaded; every pattern compiles to silence");
    }

    let narrative = match config.narrative_path(&base) {
        Some(path) => Narrative::load(&path).unwrap_or_else(|e| {
            warn!("narrative unavailable: {e}");
            Narrative::default()
        }),
        None => Narrative::default(),
    };
    Ok((library, narrative))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
