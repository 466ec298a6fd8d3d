use sedusa_core::{Config, PatternKind};
use serde::Serialize;

use super::{load_content, print_json, CliResult};

#[derive(Serialize)]
struct PatternRow {
    name: String,
    kind: PatternKind,
    band: String,
    motion: &'static str,
    duration_ms: u64,
    dominant_band: Option<String>,
}

pub fn run(json: bool) -> CliResult {
    let config = Config::load()?;
    let (library, _) = load_content(&config)?;

    let rows: Vec<PatternRow> = library
        .iter()
        .map(|p| PatternRow {
            name: p.name.clone(),
            kind: p.kind,
            band: p.band().to_string(),
            motion: match p.kind {
                PatternKind::Simple => p.motion.name(),
                PatternKind::Combo => "combo",
            },
            duration_ms: p.duration_ms,
            dominant_band: p.dominant_band.map(|b| b.to_string()),
        })
        .collect();

    if json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No patterns loaded.");
        return Ok(());
    }
    for row in &rows {
        let dominant = row
            .dominant_band
            .as_deref()
            .map(|b| format!(" dominant={b}"))
            .unwrap_or_default();
        println!(
            "{:<28} {:<8} band={} {:>6}ms{}",
            row.name, row.motion, row.band, row.duration_ms, dominant
        );
    }
    Ok(())
}
