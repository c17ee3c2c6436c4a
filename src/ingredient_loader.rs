use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::path::Path;

use crate::storage::Store;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Reads `name,measurement_unit` rows (no header line).
///
/// Rows with an empty name are dropped.
pub fn read_ingredients_csv(csv_path: &Path) -> Result<Vec<(String, String)>> {
    if !csv_path.exists() {
        return Err(anyhow::anyhow!("Ingredient CSV file not found at: {:?}", csv_path));
    }

    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open ingredient CSV file at {:?}", csv_path))?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut ingredients = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read record at row index {}", row_index))?;

        let name = record.get(0).unwrap_or("").trim().to_string();
        if name.is_empty() {
            continue;
        }
        let unit = record
            .get(1)
            .map(|s| s.trim().to_string())
            .ok_or_else(|| anyhow::anyhow!("Missing measurement unit for '{}' at row {}", name, row_index))?;

        ingredients.push((name, unit));
    }

    Ok(ingredients)
}

/// Imports the ingredient catalogue; pairs that already exist are skipped.
pub fn load_ingredients(store: &Store, csv_path: &Path) -> Result<LoadReport> {
    let rows = read_ingredients_csv(csv_path)?;
    let mut report = LoadReport::default();
    for (name, unit) in rows {
        if store
            .insert_ingredient(&name, &unit)
            .with_context(|| format!("Failed to store ingredient '{}'", name))?
        {
            report.inserted += 1;
        } else {
            report.skipped += 1;
        }
    }
    Ok(report)
}
