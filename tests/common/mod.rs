#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rust_xlsxwriter::{Workbook, XlsxError};

/// A cell in a fixture sheet.
pub enum Cell {
    Text(&'static str),
    Number(f64),
}

use Cell::{Number, Text};

pub fn unique_temp_path(name: &str, extension: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("wall-details-{name}-{stamp}.{extension}"))
}

pub fn write_sheets(path: &Path, sheets: &[(&str, Vec<Vec<Cell>>)]) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name)?;
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                match cell {
                    Text("") => {}
                    Text(text) => {
                        worksheet.write_string(r as u32, c as u16, *text)?;
                    }
                    Number(value) => {
                        worksheet.write_number(r as u32, c as u16, *value)?;
                    }
                }
            }
        }
    }
    workbook.save(path)
}

fn texts(cells: &[&'static str]) -> Vec<Cell> {
    cells.iter().map(|c| Text(*c)).collect()
}

/// Three conventional sheets: two provinces with cities, a third (P-03) with
/// none, and detail rows for C-01-01 and C-02-01 only.
pub fn materials_sheets() -> Vec<(&'static str, Vec<Vec<Cell>>)> {
    vec![
        (
            "Sheet0",
            vec![
                texts(&["P-01", "تهران"]),
                texts(&["P-02", "Alborz"]),
                texts(&["P-03", "Fars"]),
            ],
        ),
        (
            "Sheet1",
            vec![
                texts(&["P-01", "Tehran", "C-01-01", "Shahriar"]),
                texts(&["P-01", "Tehran", "C-01-02", "Varamin"]),
                texts(&["P-02", "Alborz", "C-02-01", "Karaj"]),
            ],
        ),
        (
            "Sheet3",
            vec![
                vec![Text("C-01-01"), Text("Exterior Wall Type A"), Number(120.0)],
                vec![Text("C-01-01"), Text("Interior Wall"), Number(90.0)],
                vec![Text("C-02-01"), Text("Exterior Wall, Type B"), Number(150.5)],
            ],
        ),
    ]
}

/// A province (P-03) with no city rows and no city codes anywhere in the city
/// sheet, but a detail row that mentions it.
pub fn cityless_fixture(name: &str) -> PathBuf {
    let path = unique_temp_path(name, "xlsx");
    write_sheets(
        &path,
        &[
            ("Sheet0", vec![texts(&["P-03", "Fars"])]),
            ("Sheet1", vec![texts(&["P-01", "Tehran", "", "Karaj"])]),
            ("Sheet3", vec![texts(&["Shiraz", "Wall A", "P-03"])]),
        ],
    )
    .expect("fixture workbook should be written");
    path
}

pub fn materials_fixture(name: &str) -> PathBuf {
    let path = unique_temp_path(name, "xlsx");
    write_sheets(&path, &materials_sheets()).expect("fixture workbook should be written");
    path
}
