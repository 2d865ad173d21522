//! The `cybermetric validate` command.

use anyhow::Result;

use cybermetric_core::dataset::{load_dataset, validate_dataset};

use super::resolve_dataset_path;

pub fn execute(test: &str) -> Result<()> {
    let path = resolve_dataset_path(test);
    let dataset = load_dataset(&path)?;

    println!("Dataset: {} ({} questions)", dataset.name, dataset.len());

    let warnings = validate_dataset(&dataset);
    for w in &warnings {
        let prefix = w
            .index
            .map(|i| format!("  [#{}]", i + 1))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Dataset valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
