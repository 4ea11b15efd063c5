//! Province list: find `P-NN` codes anywhere in the province sheet and pair each
//! with the nearest non-code text in the same row.

use serde::Serialize;

use crate::lookup::patterns::{find_all_province_codes, find_province_code, has_province_code};
use crate::sheet::Sheet;

/// How far left/right of a code cell a name may sit.
pub const NAME_SEARCH_SPAN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvinceRecord {
    pub code: String,
    pub name: String,
}

impl ProvinceRecord {
    /// Label shown in selection lists: `"P-01 — Tehran"`, or the bare code for
    /// self-named records.
    pub fn label(&self) -> String {
        if self.name == self.code {
            self.code.clone()
        } else {
            format!("{} — {}", self.code, self.name)
        }
    }

    pub fn is_self_named(&self) -> bool {
        self.name == self.code
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvinceStrategy {
    /// Code cells, named by an adjacent text cell.
    AdjacentName,
    /// Codes found in the row-major concatenation of all cells, self-named.
    FlattenedCodes,
}

pub const PROVINCE_STRATEGIES: [ProvinceStrategy; 2] =
    [ProvinceStrategy::AdjacentName, ProvinceStrategy::FlattenedCodes];

pub fn detect_provinces(sheet: &Sheet) -> Vec<ProvinceRecord> {
    for strategy in PROVINCE_STRATEGIES {
        let found = run_strategy(sheet, strategy);
        if !found.is_empty() {
            tracing::debug!(sheet = %sheet.name, ?strategy, count = found.len(), "provinces detected");
            return found;
        }
    }
    tracing::warn!(sheet = %sheet.name, "no province codes found");
    Vec::new()
}

fn run_strategy(sheet: &Sheet, strategy: ProvinceStrategy) -> Vec<ProvinceRecord> {
    match strategy {
        ProvinceStrategy::AdjacentName => adjacent_name(sheet),
        ProvinceStrategy::FlattenedCodes => flattened_codes(sheet),
    }
}

fn adjacent_name(sheet: &Sheet) -> Vec<ProvinceRecord> {
    let mut records = Vec::new();
    for row in sheet.rows() {
        for (col, cell) in row.iter().enumerate() {
            let Some(code) = find_province_code(cell) else {
                continue;
            };
            let name = name_near(row, col).unwrap_or_else(|| code.clone());
            push_unique(&mut records, ProvinceRecord { code, name });
        }
    }
    records
}

fn name_near(row: &[String], col: usize) -> Option<String> {
    let is_name = |cell: &&String| !cell.is_empty() && !has_province_code(cell);

    let right = row.iter().skip(col + 1).take(NAME_SEARCH_SPAN).find(is_name);
    let left = || {
        row[..col]
            .iter()
            .rev()
            .take(NAME_SEARCH_SPAN)
            .find(is_name)
    };
    right.or_else(left).cloned()
}

fn flattened_codes(sheet: &Sheet) -> Vec<ProvinceRecord> {
    let flat: String = sheet.rows().flat_map(|row| row.iter().map(String::as_str)).collect();
    let mut records = Vec::new();
    for code in find_all_province_codes(&flat) {
        push_unique(
            &mut records,
            ProvinceRecord {
                name: code.clone(),
                code,
            },
        );
    }
    records
}

fn push_unique(records: &mut Vec<ProvinceRecord>, record: ProvinceRecord) {
    if !records.contains(&record) {
        records.push(record);
    }
}
