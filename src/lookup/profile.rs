//! Column role inference for the city sheet.
//!
//! Each of the first few columns is scored on code hits, script hits and
//! numeric hits; the highest count wins each role and positional fallbacks
//! cover the columns that show no signal. Pure and deterministic.

use std::cmp::Reverse;

use serde::Serialize;

use crate::lookup::patterns::{
    has_city_code, has_name_script, has_province_code, is_blacklisted, is_numeric_like,
};
use crate::sheet::Sheet;

pub const DEFAULT_MAX_COLUMNS: usize = 8;
/// Leading rows checked for blacklisted keywords (header included).
pub const PROFILE_SAMPLE_ROWS: usize = 30;
/// City-code column when no cell matches the city pattern.
pub const FALLBACK_CITY_CODE_COLUMN: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnProfile {
    pub index: usize,
    pub code_p_hits: usize,
    pub code_c_hits: usize,
    pub script_hits: usize,
    pub numeric_hits: usize,
    pub blacklisted: bool,
}

impl ColumnProfile {
    fn name_score(&self) -> i64 {
        self.script_hits as i64 - self.numeric_hits as i64
    }

    fn has_code_hits(&self) -> bool {
        self.code_p_hits > 0 || self.code_c_hits > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnRoles {
    pub province: usize,
    pub city_code: usize,
    pub city_name: usize,
}

pub fn profile_columns(sheet: &Sheet, max_columns: usize) -> Vec<ColumnProfile> {
    (0..sheet.width().min(max_columns))
        .map(|index| profile_column(sheet, index))
        .collect()
}

fn profile_column(sheet: &Sheet, index: usize) -> ColumnProfile {
    let mut profile = ColumnProfile {
        index,
        ..ColumnProfile::default()
    };
    for (row, cell) in sheet.column(index).enumerate() {
        if cell.is_empty() {
            continue;
        }
        if has_province_code(cell) {
            profile.code_p_hits += 1;
        }
        if has_city_code(cell) {
            profile.code_c_hits += 1;
        }
        if has_name_script(cell) {
            profile.script_hits += 1;
        }
        if is_numeric_like(cell) {
            profile.numeric_hits += 1;
        }
        if row < PROFILE_SAMPLE_ROWS && is_blacklisted(cell) {
            profile.blacklisted = true;
        }
    }
    profile
}

pub fn assign_roles(profiles: &[ColumnProfile]) -> ColumnRoles {
    let province = best_by_count(profiles, |p| p.code_p_hits).unwrap_or(0);

    let city_code = best_by_count(profiles, |p| p.code_c_hits).unwrap_or_else(|| {
        if profiles.len() < FALLBACK_CITY_CODE_COLUMN + 1 {
            profiles.len().saturating_sub(1)
        } else {
            FALLBACK_CITY_CODE_COLUMN
        }
    });

    // Ties prefer code-free columns, then columns right of the code column,
    // then the leftmost.
    let mut city_name = profiles
        .iter()
        .filter(|p| !p.blacklisted)
        .min_by_key(|p| {
            (
                Reverse(p.name_score()),
                p.has_code_hits(),
                p.index <= city_code,
                p.index,
            )
        })
        .map_or(city_code, |p| p.index);

    if city_name == province {
        city_name = if city_code != province {
            city_code
        } else {
            province + 1
        };
    }

    ColumnRoles {
        province,
        city_code,
        city_name,
    }
}

/// Column with the highest non-zero count; lowest index wins ties.
fn best_by_count(profiles: &[ColumnProfile], count: impl Fn(&ColumnProfile) -> usize) -> Option<usize> {
    profiles
        .iter()
        .filter(|p| count(*p) > 0)
        .min_by_key(|p| (Reverse(count(*p)), p.index))
        .map(|p| p.index)
}

pub fn profile_roles(sheet: &Sheet, max_columns: usize) -> ColumnRoles {
    let profiles = profile_columns(sheet, max_columns);
    let roles = assign_roles(&profiles);
    tracing::debug!(sheet = %sheet.name, ?roles, "city sheet column roles");
    roles
}
