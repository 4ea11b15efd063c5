//! Load every sheet of a workbook (.xlsx, .xls, .ods) into text grids via calamine.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::LookupError;
use crate::sheet::{Sheet, Workbook};

/// Render a spreadsheet value as cell text. Integral floats drop their
/// fractional part so `123.0` reads as `123`.
pub fn cell_text(d: &Data) -> String {
    match d {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => format!("{f}"),
        Data::Int(i) => format!("{i}"),
        Data::Bool(b) => format!("{b}"),
        other => other.to_string(),
    }
}

pub fn load_workbook(path: &Path) -> Result<Workbook, LookupError> {
    if !path.exists() {
        return Err(LookupError::SourceMissing {
            path: path.to_path_buf(),
        });
    }
    let unreadable = |cause: String| LookupError::SourceUnreadable {
        path: path.to_path_buf(),
        cause,
    };

    let mut wb = open_workbook_auto(path).map_err(|e| unreadable(e.to_string()))?;
    let names = wb.sheet_names();
    let mut sheets = Vec::with_capacity(names.len());
    for name in &names {
        let range = wb
            .worksheet_range(name)
            .map_err(|e| unreadable(format!("sheet '{name}': {e}")))?;

        // calamine ranges start at the first used cell; pad back to A1 so
        // positional column fallbacks see the same indices as the file.
        let (row_offset, col_offset) = range
            .start()
            .map_or((0, 0), |(r, c)| (r as usize, c as usize));
        let mut rows: Vec<Vec<String>> = vec![Vec::new(); row_offset];
        for row in range.rows() {
            let mut cells = vec![String::new(); col_offset];
            cells.extend(row.iter().map(cell_text));
            rows.push(cells);
        }
        tracing::debug!(sheet = %name, rows = rows.len(), "loaded sheet");
        sheets.push(Sheet::from_rows(name, rows));
    }

    tracing::info!(path = %path.display(), sheets = sheets.len(), "workbook loaded");
    Ok(Workbook::new(path, sheets))
}
