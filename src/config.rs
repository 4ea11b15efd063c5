//! Runtime settings: defaults, overridden by `WALL_DETAILS_*` environment
//! variables, overridden by command-line flags.

use std::env;
use std::path::PathBuf;

use crate::lookup::profile::DEFAULT_MAX_COLUMNS;
use crate::sheet::SheetOverrides;

pub const DEFAULT_SOURCE_PATH: &str = "materials.xlsx";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8501";
pub const DEFAULT_CITY_LIST_LIMIT: usize = 400;

pub const ENV_SOURCE: &str = "WALL_DETAILS_SOURCE";
pub const ENV_BIND: &str = "WALL_DETAILS_BIND";
pub const ENV_PROVINCE_SHEET: &str = "WALL_DETAILS_PROVINCE_SHEET";
pub const ENV_CITY_SHEET: &str = "WALL_DETAILS_CITY_SHEET";
pub const ENV_DETAIL_SHEET: &str = "WALL_DETAILS_DETAIL_SHEET";
pub const ENV_MAX_COLUMNS: &str = "WALL_DETAILS_MAX_COLUMNS";
pub const ENV_CITY_LIMIT: &str = "WALL_DETAILS_CITY_LIMIT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub source: PathBuf,
    pub bind_addr: String,
    pub sheets: SheetOverrides,
    /// Columns of the city sheet examined by the profiler.
    pub max_columns: usize,
    /// Longest city list handed to a user.
    pub city_list_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: PathBuf::from(DEFAULT_SOURCE_PATH),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            sheets: SheetOverrides::default(),
            max_columns: DEFAULT_MAX_COLUMNS,
            city_list_limit: DEFAULT_CITY_LIST_LIMIT,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve settings through an arbitrary variable lookup, so tests need not
    /// touch the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            source: non_empty(ENV_SOURCE).map_or(defaults.source, PathBuf::from),
            bind_addr: non_empty(ENV_BIND).unwrap_or(defaults.bind_addr),
            sheets: SheetOverrides {
                province: non_empty(ENV_PROVINCE_SHEET),
                city: non_empty(ENV_CITY_SHEET),
                detail: non_empty(ENV_DETAIL_SHEET),
            },
            max_columns: parse_count(non_empty(ENV_MAX_COLUMNS), ENV_MAX_COLUMNS, defaults.max_columns),
            city_list_limit: parse_count(
                non_empty(ENV_CITY_LIMIT),
                ENV_CITY_LIMIT,
                defaults.city_list_limit,
            ),
        }
    }
}

/// Positive integer setting; anything else keeps `default` with a warning.
pub fn parse_count(raw: Option<String>, name: &str, default: usize) -> usize {
    match raw.as_deref().map(str::trim) {
        None => default,
        Some(value) => match value.parse::<usize>() {
            Ok(parsed) if parsed > 0 => parsed,
            _ => {
                tracing::warn!("invalid {name} '{value}', defaulting to {default}");
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use super::{parse_count, Settings, ENV_CITY_LIMIT, ENV_MAX_COLUMNS, ENV_SOURCE, ENV_CITY_SHEET};

    #[test]
    fn defaults_without_environment() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.source, PathBuf::from("materials.xlsx"));
        assert_eq!(settings.max_columns, 8);
        assert_eq!(settings.city_list_limit, 400);
    }

    #[test]
    fn environment_overrides_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_SOURCE, "data/walls.xlsx"),
            (ENV_CITY_SHEET, "Cities"),
            (ENV_MAX_COLUMNS, "5"),
            (ENV_CITY_LIMIT, "zero"),
        ]);
        let settings = Settings::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(settings.source, PathBuf::from("data/walls.xlsx"));
        assert_eq!(settings.sheets.city.as_deref(), Some("Cities"));
        assert_eq!(settings.sheets.province, None);
        assert_eq!(settings.max_columns, 5);
        assert_eq!(settings.city_list_limit, 400);
    }

    #[test]
    fn zero_is_not_a_valid_count() {
        assert_eq!(parse_count(Some("0".into()), "limit", 9), 9);
        assert_eq!(parse_count(Some(" 12 ".into()), "limit", 9), 12);
        assert_eq!(parse_count(None, "limit", 9), 9);
    }
}
