//! Detail rows for a selected city, matched against the whole row text.

use serde::Serialize;

use crate::lookup::patterns::{contains_ci, is_city_code};
use crate::sheet::Sheet;

/// Joins cells before substring matching so a match cannot straddle two cells.
pub const ROW_SEPARATOR: &str = " | ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailRow {
    /// Zero-based row index in the detail sheet.
    pub source_row: usize,
    pub cells: Vec<String>,
}

/// Matched rows re-labelled `Column_1..Column_N`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetailTable {
    pub columns: Vec<String>,
    pub rows: Vec<DetailRow>,
}

impl DetailTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

pub fn positional_labels(width: usize) -> Vec<String> {
    (1..=width).map(|i| format!("Column_{i}")).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailStrategy {
    /// Row text contains the city identifier and the province code.
    CityAndProvince,
    /// Row text contains the city identifier alone. Can pick up a namesake
    /// city from another province.
    CityOnly,
}

/// Tried in order for city names; code-form identifiers go straight
/// to [`DetailStrategy::CityOnly`].
pub const NAME_DETAIL_STRATEGIES: [DetailStrategy; 2] =
    [DetailStrategy::CityAndProvince, DetailStrategy::CityOnly];

pub fn details_for(sheet: &Sheet, province_code: &str, city_identifier: &str) -> DetailTable {
    let city = city_identifier.trim();
    let mut table = DetailTable {
        columns: positional_labels(sheet.width()),
        rows: Vec::new(),
    };
    if city.is_empty() {
        return table;
    }

    let strategies: &[DetailStrategy] = if is_city_code(city) {
        &[DetailStrategy::CityOnly]
    } else {
        &NAME_DETAIL_STRATEGIES
    };

    let texts: Vec<String> = sheet.rows().map(|row| row.join(ROW_SEPARATOR)).collect();
    for strategy in strategies {
        let matched: Vec<DetailRow> = texts
            .iter()
            .enumerate()
            .filter(|(_, text)| row_matches(text, province_code, city, *strategy))
            .filter_map(|(index, _)| {
                sheet.row(index).map(|cells| DetailRow {
                    source_row: index,
                    cells: cells.to_vec(),
                })
            })
            .collect();
        if !matched.is_empty() {
            tracing::debug!(
                sheet = %sheet.name,
                city,
                strategy = ?strategy,
                count = matched.len(),
                "detail rows matched"
            );
            table.rows = matched;
            return table;
        }
    }
    tracing::warn!(sheet = %sheet.name, city, province = province_code, "no detail rows matched");
    table
}

fn row_matches(text: &str, province_code: &str, city: &str, strategy: DetailStrategy) -> bool {
    match strategy {
        DetailStrategy::CityAndProvince => contains_ci(text, city) && contains_ci(text, province_code),
        DetailStrategy::CityOnly => contains_ci(text, city),
    }
}

#[cfg(test)]
mod tests {
    use super::{details_for, positional_labels};
    use crate::sheet::Sheet;

    fn detail_sheet() -> Sheet {
        Sheet::from_rows(
            "Sheet3",
            vec![
                vec!["C-01-01", "Exterior Wall Type A", "120mm"],
                vec!["C-02-01", "Interior Wall", "90mm"],
                vec!["c-01-01", "Exterior Wall Type B", "150mm"],
                vec!["P-02", "Karaj", "200mm"],
            ],
        )
    }

    #[test]
    fn code_form_matches_any_row_with_the_code() {
        let table = details_for(&detail_sheet(), "P-99", "C-01-01");
        let rows: Vec<usize> = table.rows.iter().map(|r| r.source_row).collect();
        assert_eq!(rows, vec![0, 2]);
        assert_eq!(table.columns, vec!["Column_1", "Column_2", "Column_3"]);
        assert_eq!(table.rows[0].cells[1], "Exterior Wall Type A");
    }

    #[test]
    fn name_form_needs_province_too_unless_nothing_matches() {
        let sheet = Sheet::from_rows(
            "Sheet3",
            vec![
                vec!["P-01", "Karaj", "A"],
                vec!["P-02", "Karaj", "B"],
                vec!["P-01", "Tehran", "C"],
            ],
        );
        let table = details_for(&sheet, "P-02", "karaj");
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].source_row, 1);

        let fallback = details_for(&sheet, "P-07", "Karaj");
        let rows: Vec<usize> = fallback.rows.iter().map(|r| r.source_row).collect();
        assert_eq!(rows, vec![0, 1]);
    }

    #[test]
    fn unknown_name_yields_empty_table() {
        let sheet = Sheet::from_rows(
            "Sheet3",
            vec![vec!["C-01-01", "Exterior Wall Type A", "120mm"]],
        );
        let table = details_for(&sheet, "P-01", "Karaj");
        assert!(table.is_empty());
        assert_eq!(table.columns.len(), 3);
    }

    #[test]
    fn blank_identifier_matches_nothing() {
        assert!(details_for(&detail_sheet(), "P-01", "   ").is_empty());
    }

    #[test]
    fn output_preserves_sheet_order() {
        let sheet = Sheet::from_rows(
            "Sheet3",
            (0..20)
                .map(|i| vec![if i % 3 == 0 { "C-04-04".to_string() } else { format!("row {i}") }])
                .collect(),
        );
        let rows: Vec<usize> = details_for(&sheet, "", "C-04-04")
            .rows
            .iter()
            .map(|r| r.source_row)
            .collect();
        let mut sorted = rows.clone();
        sorted.sort_unstable();
        assert_eq!(rows, sorted);
        assert_eq!(rows.len(), 7);
    }

    #[test]
    fn labels_are_one_based() {
        assert_eq!(positional_labels(2), vec!["Column_1", "Column_2"]);
        assert!(positional_labels(0).is_empty());
    }
}
