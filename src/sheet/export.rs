//! Write a detail table out as .xlsx (one `Wall_Details` sheet) or .csv.

use std::io::Write;
use std::path::Path;

use rust_xlsxwriter::Workbook;

use crate::error::LookupError;
use crate::lookup::DetailTable;

pub const EXPORT_SHEET_NAME: &str = "Wall_Details";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// `wall_details_<city>.<ext>` with path-hostile characters replaced.
pub fn export_file_name(city: &str, extension: &str) -> String {
    let cleaned: String = city
        .trim()
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            ch if ch.is_control() || ch.is_whitespace() => '_',
            ch => ch,
        })
        .collect();
    let stem = if cleaned.is_empty() { "selection" } else { cleaned.as_str() };
    format!("wall_details_{stem}.{extension}")
}

fn build_workbook(table: &DetailTable) -> Result<Workbook, LookupError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(EXPORT_SHEET_NAME)?;

    for (col, label) in table.columns.iter().enumerate() {
        worksheet.write_string(0, col_index(col)?, label)?;
    }
    for (i, row) in table.rows.iter().enumerate() {
        let r = u32::try_from(i + 1).map_err(|_| LookupError::Export("too many rows".into()))?;
        for (col, cell) in row.cells.iter().enumerate() {
            if !cell.is_empty() {
                worksheet.write_string(r, col_index(col)?, cell)?;
            }
        }
    }
    Ok(workbook)
}

fn col_index(col: usize) -> Result<u16, LookupError> {
    u16::try_from(col).map_err(|_| LookupError::Export("too many columns".into()))
}

pub fn xlsx_bytes(table: &DetailTable) -> Result<Vec<u8>, LookupError> {
    Ok(build_workbook(table)?.save_to_buffer()?)
}

pub fn write_xlsx(table: &DetailTable, path: &Path) -> Result<(), LookupError> {
    build_workbook(table)?.save(path)?;
    tracing::info!(path = %path.display(), rows = table.len(), "exported xlsx");
    Ok(())
}

pub fn write_csv<W: Write>(table: &DetailTable, out: W) -> Result<(), LookupError> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(out);
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(&row.cells)?;
    }
    writer
        .flush()
        .map_err(|e| LookupError::Export(e.to_string()))?;
    Ok(())
}
