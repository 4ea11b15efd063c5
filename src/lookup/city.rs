//! City list for one province: rows of the city sheet that mention the province
//! code, read through the inferred column roles.

use serde::Serialize;

use crate::lookup::patterns::{contains_ci, find_city_code, is_null_marker, is_numeric_like};
use crate::lookup::profile::ColumnRoles;
use crate::sheet::Sheet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityRecord {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CityStrategy {
    /// Province code inside the province column.
    ProvinceColumn,
    /// Province code anywhere in the row.
    AnyCell,
    /// Every city-code cell in the sheet, self-named. Not scoped to the province.
    SheetWideCodes,
}

pub const CITY_STRATEGIES: [CityStrategy; 3] = [
    CityStrategy::ProvinceColumn,
    CityStrategy::AnyCell,
    CityStrategy::SheetWideCodes,
];

/// The first strategy whose row filter selects anything decides the result,
/// even when none of its rows yields a record.
pub fn cities_for_province(sheet: &Sheet, roles: &ColumnRoles, province_code: &str) -> Vec<CityRecord> {
    if province_code.trim().is_empty() {
        return Vec::new();
    }
    for strategy in CITY_STRATEGIES {
        let Some(found) = run_strategy(sheet, roles, province_code, strategy) else {
            continue;
        };
        tracing::debug!(
            sheet = %sheet.name,
            province = province_code,
            ?strategy,
            count = found.len(),
            "cities derived"
        );
        if found.is_empty() {
            tracing::warn!(sheet = %sheet.name, province = province_code, ?strategy, "matched rows hold no city");
        }
        return found;
    }
    tracing::warn!(sheet = %sheet.name, province = province_code, "no cities derived");
    Vec::new()
}

/// `None` when the strategy selects no rows at all.
fn run_strategy(
    sheet: &Sheet,
    roles: &ColumnRoles,
    province_code: &str,
    strategy: CityStrategy,
) -> Option<Vec<CityRecord>> {
    let rows: Vec<&[String]> = match strategy {
        CityStrategy::ProvinceColumn => sheet
            .rows()
            .filter(|row| {
                row.get(roles.province)
                    .is_some_and(|cell| contains_ci(cell, province_code))
            })
            .collect(),
        CityStrategy::AnyCell => sheet
            .rows()
            .filter(|row| row.iter().any(|cell| contains_ci(cell, province_code)))
            .collect(),
        CityStrategy::SheetWideCodes => {
            let mut records = Vec::new();
            for code in sheet.rows().flatten().filter_map(|cell| find_city_code(cell)) {
                push_unique_name(
                    &mut records,
                    CityRecord {
                        name: code.clone(),
                        code,
                    },
                );
            }
            return (!records.is_empty()).then_some(records);
        }
    };
    (!rows.is_empty()).then(|| records_from_rows(rows, roles))
}

fn records_from_rows(rows: Vec<&[String]>, roles: &ColumnRoles) -> Vec<CityRecord> {
    let mut records = Vec::new();
    for row in rows {
        if let Some(record) = record_from_row(row, roles) {
            push_unique_name(&mut records, record);
        }
    }
    records
}

fn record_from_row(row: &[String], roles: &ColumnRoles) -> Option<CityRecord> {
    let code_cell = row.get(roles.city_code).map_or("", String::as_str);
    let code = find_city_code(code_cell).unwrap_or_else(|| code_cell.trim().to_string());

    let name_cell = row.get(roles.city_name).map_or("", |c| c.trim());
    let name = if is_null_marker(name_cell) || is_numeric_like(name_cell) {
        code.clone()
    } else {
        name_cell.to_string()
    };

    if name.is_empty() {
        return None;
    }
    Some(CityRecord { code, name })
}

fn push_unique_name(records: &mut Vec<CityRecord>, record: CityRecord) {
    if !records.iter().any(|r| r.name == record.name) {
        records.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::{cities_for_province, CityRecord};
    use crate::lookup::patterns::contains_ci;
    use crate::lookup::profile::{profile_roles, ColumnRoles};
    use crate::sheet::Sheet;

    const ROLES: ColumnRoles = ColumnRoles {
        province: 0,
        city_code: 2,
        city_name: 3,
    };

    fn record(code: &str, name: &str) -> CityRecord {
        CityRecord {
            code: code.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn filters_by_province_column() {
        let sheet = Sheet::from_rows(
            "Sheet1",
            vec![
                vec!["P-01", "Tehran", "C-01-01", "Karaj"],
                vec!["P-02", "Alborz", "C-02-01", "Sari"],
            ],
        );
        let roles = profile_roles(&sheet, 8);
        assert_eq!(
            cities_for_province(&sheet, &roles, "P-01"),
            vec![record("C-01-01", "Karaj")]
        );
    }

    #[test]
    fn province_match_is_case_insensitive_substring() {
        let sheet = Sheet::from_rows(
            "Sheet1",
            vec![vec!["prov p-01 (north)", "", "C-01-01", "Karaj"]],
        );
        assert_eq!(cities_for_province(&sheet, &ROLES, "P-01").len(), 1);
    }

    #[test]
    fn widens_to_whole_row_when_province_column_misses() {
        let sheet = Sheet::from_rows(
            "Sheet1",
            vec![
                vec!["", "P-01", "C-01-01", "Karaj"],
                vec!["", "P-02", "C-02-01", "Sari"],
            ],
        );
        assert_eq!(
            cities_for_province(&sheet, &ROLES, "P-01"),
            vec![record("C-01-01", "Karaj")]
        );
    }

    #[test]
    fn empty_numeric_or_null_names_fall_back_to_code() {
        let sheet = Sheet::from_rows(
            "Sheet1",
            vec![
                vec!["P-01", "", "C-01-01", ""],
                vec!["P-01", "", "C-01-02", "123"],
                vec!["P-01", "", "C-01-03", "nan"],
            ],
        );
        assert_eq!(
            cities_for_province(&sheet, &ROLES, "P-01"),
            vec![
                record("C-01-01", "C-01-01"),
                record("C-01-02", "C-01-02"),
                record("C-01-03", "C-01-03"),
            ]
        );
    }

    #[test]
    fn duplicate_names_keep_first_seen() {
        let sheet = Sheet::from_rows(
            "Sheet1",
            vec![
                vec!["P-01", "", "C-01-01", "Karaj"],
                vec!["P-01", "", "C-01-09", "Karaj"],
                vec!["P-01", "", "C-01-02", "Shahriar"],
            ],
        );
        assert_eq!(
            cities_for_province(&sheet, &ROLES, "P-01"),
            vec![record("C-01-01", "Karaj"), record("C-01-02", "Shahriar")]
        );
    }

    #[test]
    fn unmatched_province_falls_back_to_sheet_wide_codes() {
        let sheet = Sheet::from_rows(
            "Sheet1",
            vec![vec!["x", "C-05-01"], vec!["y", "c-05-02 / C-05-01"]],
        );
        assert_eq!(
            cities_for_province(&sheet, &ROLES, "P-09"),
            vec![record("C-05-01", "C-05-01"), record("C-05-02", "C-05-02")]
        );
    }

    #[test]
    fn province_column_hit_without_city_does_not_widen() {
        let sheet = Sheet::from_rows(
            "Sheet1",
            vec![
                vec!["P-01", "", "", ""],
                vec!["x", "P-01 and P-02", "C-02-01", "Sari"],
            ],
        );
        assert!(cities_for_province(&sheet, &ROLES, "P-01").is_empty());
        assert_eq!(
            cities_for_province(&sheet, &ROLES, "P-02"),
            vec![record("C-02-01", "Sari")]
        );
    }

    #[test]
    fn nothing_to_find_yields_empty() {
        let sheet = Sheet::from_rows("Sheet1", vec![vec!["a", "b"]]);
        assert!(cities_for_province(&sheet, &ROLES, "P-01").is_empty());
        assert!(cities_for_province(&sheet, &ROLES, "  ").is_empty());
    }

    #[test]
    fn returned_rows_contain_the_province_code() {
        let rows = vec![
            vec!["P-01", "تهران", "C-01-01", "کرج"],
            vec!["P-01", "تهران", "C-01-02", "شهریار"],
            vec!["P-02", "البرز", "C-02-01", "ساری"],
            vec!["P-03", "فارس", "C-03-01", "شیراز"],
        ];
        let sheet = Sheet::from_rows("Sheet1", rows.clone());
        let roles = profile_roles(&sheet, 8);
        for province in ["P-01", "P-02", "P-03"] {
            for city in cities_for_province(&sheet, &roles, province) {
                let row = rows
                    .iter()
                    .find(|r| r[2] == city.code)
                    .expect("city comes from a sheet row");
                assert!(row.iter().any(|cell| contains_ci(cell, province)));
            }
        }
    }
}
