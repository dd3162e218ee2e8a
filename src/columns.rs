//! Column listing for the loaded data file.
//!
//! Renders every column with its detected kind, then the optional features
//! and whether the file supports them.

use anyhow::Result;
use log::info;

use crate::{
    dataset::Table,
    schema::{OPTIONAL_FEATURES, REQUIRED_COLUMNS},
    table,
};

pub fn column_rows(table: &Table) -> Vec<Vec<String>> {
    table
        .headers()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let role = if REQUIRED_COLUMNS.contains(&name.as_str()) {
                "required"
            } else {
                ""
            };
            vec![
                (idx + 1).to_string(),
                name.clone(),
                table.column_kind(idx).to_string(),
                role.to_string(),
            ]
        })
        .collect()
}

pub fn feature_rows(table: &Table) -> Vec<Vec<String>> {
    OPTIONAL_FEATURES
        .iter()
        .map(|(column, feature)| {
            let status = if table.has_column(column) {
                "available"
            } else {
                "skipped"
            };
            vec![column.to_string(), feature.to_string(), status.to_string()]
        })
        .collect()
}

pub fn execute(dataset: &Table) -> Result<()> {
    let rows = column_rows(dataset);
    table::print_table(&table::headers(&["#", "name", "kind", "role"]), &rows);
    println!();
    table::print_table(
        &table::headers(&["column", "feature", "status"]),
        &feature_rows(dataset),
    );
    info!("Listed {} column(s)", rows.len());
    Ok(())
}
