//! The three-stage lookup: provinces from the province sheet, cities of one
//! province from the city sheet, detail rows of one city from the detail sheet.
//!
//! Everything below [`session`] is a pure function of an immutable [`Sheet`]
//! and returns an empty collection when its heuristics find nothing.
//!
//! [`Sheet`]: crate::sheet::Sheet

pub mod city;
pub mod detail;
pub mod patterns;
pub mod profile;
pub mod province;
pub mod session;

pub use city::{cities_for_province, CityRecord, CityStrategy, CITY_STRATEGIES};
pub use detail::{details_for, DetailRow, DetailStrategy, DetailTable, NAME_DETAIL_STRATEGIES};
pub use profile::{assign_roles, profile_columns, profile_roles, ColumnProfile, ColumnRoles};
pub use province::{detect_provinces, ProvinceRecord, ProvinceStrategy, PROVINCE_STRATEGIES};
pub use session::{SelectionState, Session};
