//! Inspect a materials workbook: sheet names, the sheets picked for each role,
//! the inferred city-sheet columns and the first rows of every sheet.
//! Usage: cargo run --bin inspect_workbook -- path/to/materials.xlsx [rows]

use std::path::Path;

use wall_details::config::{parse_count, Settings};
use wall_details::lookup::{profile_columns, profile_roles};
use wall_details::sheet::{load_workbook, select_sheets};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env();
    let path = std::env::args()
        .nth(1)
        .map(Into::into)
        .unwrap_or_else(|| settings.source.clone());
    let rows = parse_count(std::env::args().nth(2), "rows", 10);

    let workbook = load_workbook(Path::new(&path))?;
    let names = workbook.sheet_names();
    println!("Sheets ({}): {}", names.len(), names.join(", "));
    if names.is_empty() {
        return Err("workbook has no sheets".into());
    }

    let roles = select_sheets(&names, &settings.sheets)?;
    println!(
        "Roles: province={} city={} detail={}",
        names[roles.province], names[roles.city], names[roles.detail]
    );

    let city_sheet = &workbook.sheets[roles.city];
    for profile in profile_columns(city_sheet, settings.max_columns) {
        println!(
            "  col {}: P={} C={} script={} numeric={}{}",
            profile.index,
            profile.code_p_hits,
            profile.code_c_hits,
            profile.script_hits,
            profile.numeric_hits,
            if profile.blacklisted { " (blacklisted)" } else { "" }
        );
    }
    println!("City columns: {:?}", profile_roles(city_sheet, settings.max_columns));

    for sheet in &workbook.sheets {
        println!("\n{}: {} rows x {} cols", sheet.name, sheet.height(), sheet.width());
        for (i, row) in sheet.rows().take(rows).enumerate() {
            println!("  {}: {}", i, row.join(" | "));
        }
    }
    Ok(())
}
