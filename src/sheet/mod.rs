//! In-memory table store: every sheet as a rectangular grid of trimmed text cells.
//! No header row is assumed; row 0 is data like any other.

pub mod cache;
pub mod export;
pub mod loader;
pub mod select;

use std::path::{Path, PathBuf};

use serde::Serialize;

pub use cache::WorkbookCache;
pub use loader::load_workbook;
pub use select::{select_sheets, SheetOverrides, SheetRole, SheetRoles};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sheet {
    pub name: String,
    rows: Vec<Vec<String>>,
    width: usize,
}

impl Sheet {
    /// Build a sheet from raw rows. Cells are trimmed and short rows padded
    /// with empty cells so every row has the same width.
    pub fn from_rows<S: Into<String>>(name: &str, rows: Vec<Vec<S>>) -> Self {
        let mut rows: Vec<Vec<String>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(|cell| cell.into().trim().to_string()).collect())
            .collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, String::new());
        }
        Self {
            name: name.to_string(),
            rows,
            width,
        }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.width == 0
    }

    /// Cell text, or `""` outside the grid.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map_or("", String::as_str)
    }

    pub fn row(&self, row: usize) -> Option<&[String]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, col: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |r| r.get(col).map_or("", String::as_str))
    }

    /// First `limit` rows, for diagnostics.
    pub fn preview(&self, limit: usize) -> Vec<Vec<String>> {
        self.rows.iter().take(limit).cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workbook {
    pub path: PathBuf,
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(path: impl AsRef<Path>, sheets: Vec<Sheet>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            sheets,
        }
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}
