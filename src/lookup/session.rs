//! One user's walk through province → city → details.
//!
//! The session owns an immutable workbook snapshot and the current selection.
//! Picking a province clears the city and detail selection. Empty heuristic
//! results become [`LookupError`] variants here and nowhere earlier.

use std::sync::Arc;

use serde::Serialize;

use crate::config::Settings;
use crate::error::LookupError;
use crate::lookup::city::{cities_for_province, CityRecord};
use crate::lookup::detail::{details_for, DetailTable};
use crate::lookup::profile::{profile_roles, ColumnRoles};
use crate::lookup::province::{detect_provinces, ProvinceRecord};
use crate::sheet::{select_sheets, Sheet, SheetRole, SheetRoles, Workbook};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SelectionState {
    NoProvinceSelected,
    ProvinceSelected { province: ProvinceRecord },
    CitySelected { province: ProvinceRecord, city: String },
    /// Held only while the matcher runs.
    DetailsRequested { province: ProvinceRecord, city: String },
    DetailsShown { province: ProvinceRecord, city: String, rows: usize },
    DetailsEmpty { province: ProvinceRecord, city: String },
}

impl SelectionState {
    pub fn province(&self) -> Option<&ProvinceRecord> {
        match self {
            Self::NoProvinceSelected => None,
            Self::ProvinceSelected { province }
            | Self::CitySelected { province, .. }
            | Self::DetailsRequested { province, .. }
            | Self::DetailsShown { province, .. }
            | Self::DetailsEmpty { province, .. } => Some(province),
        }
    }

    pub fn city(&self) -> Option<&str> {
        match self {
            Self::NoProvinceSelected | Self::ProvinceSelected { .. } => None,
            Self::CitySelected { city, .. }
            | Self::DetailsRequested { city, .. }
            | Self::DetailsShown { city, .. }
            | Self::DetailsEmpty { city, .. } => Some(city),
        }
    }
}

#[derive(Debug)]
pub struct Session {
    workbook: Arc<Workbook>,
    sheets: SheetRoles,
    columns: ColumnRoles,
    provinces: Vec<ProvinceRecord>,
    cities: Vec<CityRecord>,
    details: Option<DetailTable>,
    city_list_limit: usize,
    state: SelectionState,
}

impl Session {
    pub fn open(workbook: Arc<Workbook>, settings: &Settings) -> Result<Self, LookupError> {
        if workbook.sheets.is_empty() {
            return Err(LookupError::SourceUnreadable {
                path: workbook.path.clone(),
                cause: "workbook contains no sheets".to_string(),
            });
        }
        let sheets = select_sheets(&workbook.sheet_names(), &settings.sheets)?;
        let provinces = detect_provinces(&workbook.sheets[sheets.province]);
        let columns = profile_roles(&workbook.sheets[sheets.city], settings.max_columns);
        tracing::info!(
            province_sheet = %workbook.sheets[sheets.province].name,
            city_sheet = %workbook.sheets[sheets.city].name,
            detail_sheet = %workbook.sheets[sheets.detail].name,
            provinces = provinces.len(),
            "session opened"
        );
        Ok(Self {
            workbook,
            sheets,
            columns,
            provinces,
            cities: Vec::new(),
            details: None,
            city_list_limit: settings.city_list_limit,
            state: SelectionState::NoProvinceSelected,
        })
    }

    pub fn workbook(&self) -> &Arc<Workbook> {
        &self.workbook
    }

    pub fn sheet_roles(&self) -> SheetRoles {
        self.sheets
    }

    pub fn column_roles(&self) -> ColumnRoles {
        self.columns
    }

    pub fn sheet(&self, role: SheetRole) -> &Sheet {
        // Indices come from `select_sheets` over this workbook's names.
        &self.workbook.sheets[self.sheets.get(role)]
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn provinces(&self) -> Result<&[ProvinceRecord], LookupError> {
        if self.provinces.is_empty() {
            return Err(LookupError::NoProvincesDerived {
                sheet: self.sheet(SheetRole::Province).name.clone(),
            });
        }
        Ok(&self.provinces)
    }

    /// Cities of the selected province (empty before a selection).
    pub fn cities(&self) -> &[CityRecord] {
        &self.cities
    }

    pub fn details(&self) -> Option<&DetailTable> {
        self.details.as_ref()
    }

    /// Find a province by code, display label or name (case-insensitive).
    pub fn find_province(&self, query: &str) -> Option<&ProvinceRecord> {
        let query = query.trim();
        self.provinces
            .iter()
            .find(|p| p.code.eq_ignore_ascii_case(query))
            .or_else(|| self.provinces.iter().find(|p| p.label() == query))
            .or_else(|| {
                let lowered = query.to_lowercase();
                self.provinces.iter().find(|p| p.name.to_lowercase() == lowered)
            })
    }

    pub fn select_province(&mut self, query: &str) -> Result<&[CityRecord], LookupError> {
        self.provinces()?;
        let province = self
            .find_province(query)
            .cloned()
            .ok_or_else(|| LookupError::UnknownProvince(query.trim().to_string()))?;

        self.details = None;
        let mut cities =
            cities_for_province(self.sheet(SheetRole::City), &self.columns, &province.code);
        if cities.len() > self.city_list_limit {
            tracing::info!(
                total = cities.len(),
                limit = self.city_list_limit,
                "truncating city list"
            );
            cities.truncate(self.city_list_limit);
        }
        self.cities = cities;
        let code = province.code.clone();
        self.state = SelectionState::ProvinceSelected { province };

        if self.cities.is_empty() {
            return Err(LookupError::NoCitiesDerived {
                province: code,
                sheet: self.sheet(SheetRole::City).name.clone(),
            });
        }
        Ok(&self.cities)
    }

    /// Pick one of the listed cities by code or name (case-insensitive). The
    /// stored identifier is the listed code or name that matched.
    pub fn select_city(&mut self, identifier: &str) -> Result<(), LookupError> {
        let province = self
            .state
            .province()
            .cloned()
            .ok_or(LookupError::NoProvinceSelected)?;
        if self.cities.is_empty() {
            return Err(LookupError::NoCitiesDerived {
                province: province.code,
                sheet: self.sheet(SheetRole::City).name.clone(),
            });
        }
        let query = identifier.trim();
        if query.is_empty() {
            return Err(LookupError::NoCitySelected);
        }
        let city = self
            .find_city(query)
            .ok_or_else(|| LookupError::UnknownCity(query.to_string()))?;
        self.details = None;
        self.state = SelectionState::CitySelected { province, city };
        Ok(())
    }

    /// Listed code first, then listed name.
    fn find_city(&self, query: &str) -> Option<String> {
        let lowered = query.to_lowercase();
        self.cities
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(query))
            .map(|c| c.code.clone())
            .or_else(|| {
                self.cities
                    .iter()
                    .find(|c| c.name.to_lowercase() == lowered)
                    .map(|c| c.name.clone())
            })
    }

    pub fn request_details(&mut self) -> Result<&DetailTable, LookupError> {
        let province = self
            .state
            .province()
            .cloned()
            .ok_or(LookupError::NoProvinceSelected)?;
        let city = self
            .state
            .city()
            .map(str::to_string)
            .ok_or(LookupError::NoCitySelected)?;

        self.state = SelectionState::DetailsRequested {
            province: province.clone(),
            city: city.clone(),
        };
        let table = details_for(self.sheet(SheetRole::Detail), &province.code, &city);

        if table.is_empty() {
            self.state = SelectionState::DetailsEmpty {
                province: province.clone(),
                city: city.clone(),
            };
            self.details = None;
            return Err(LookupError::NoDetailsFound {
                province: province.code,
                city,
                sheet: self.sheet(SheetRole::Detail).name.clone(),
            });
        }

        self.state = SelectionState::DetailsShown {
            province,
            city,
            rows: table.len(),
        };
        Ok(self.details.insert(table))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{SelectionState, Session};
    use crate::config::Settings;
    use crate::error::LookupError;
    use crate::sheet::{Sheet, Workbook};

    fn workbook() -> Arc<Workbook> {
        Arc::new(Workbook::new(
            "materials.xlsx",
            vec![
                Sheet::from_rows(
                    "Sheet0",
                    vec![vec!["P-01", "Tehran"], vec!["P-02", "Alborz"], vec!["P-03", "Fars"]],
                ),
                Sheet::from_rows(
                    "Sheet1",
                    vec![
                        vec!["P-01", "Tehran", "C-01-01", "Karaj"],
                        vec!["P-01", "Tehran", "C-01-02", "Shahriar"],
                        vec!["P-02", "Alborz", "C-02-01", "Sari"],
                    ],
                ),
                Sheet::from_rows(
                    "Sheet3",
                    vec![
                        vec!["C-01-01", "Exterior Wall Type A", "120mm"],
                        vec!["C-02-01", "Interior Wall", "90mm"],
                    ],
                ),
            ],
        ))
    }

    fn session() -> Session {
        Session::open(workbook(), &Settings::default()).expect("session should open")
    }

    #[test]
    fn full_walk_reaches_details_shown() {
        let mut session = session();
        assert_eq!(session.state(), &SelectionState::NoProvinceSelected);
        assert_eq!(session.provinces().unwrap().len(), 3);

        let cities = session.select_province("p-01").unwrap();
        assert_eq!(cities.len(), 2);

        session.select_city("C-01-01").unwrap();
        let table = session.request_details().unwrap();
        assert_eq!(table.len(), 1);
        assert!(matches!(session.state(), SelectionState::DetailsShown { rows: 1, .. }));
    }

    #[test]
    fn reselecting_a_province_resets_downstream_state() {
        let mut session = session();
        session.select_province("P-01").unwrap();
        session.select_city("C-01-01").unwrap();
        session.request_details().unwrap();

        session.select_province("P-02").unwrap();
        assert!(session.details().is_none());
        assert_eq!(session.state().city(), None);
        assert_eq!(session.cities()[0].name, "Sari");
    }

    #[test]
    fn province_with_no_city_rows_is_a_named_condition() {
        let wb = Arc::new(Workbook::new(
            "m.xlsx",
            vec![
                Sheet::from_rows("Sheet0", vec![vec!["P-03", "Fars"]]),
                Sheet::from_rows("Sheet1", vec![vec!["P-01", "Tehran", "", "Karaj"]]),
            ],
        ));
        let mut session = Session::open(wb, &Settings::default()).unwrap();
        let err = session.select_province("Fars").unwrap_err();
        assert!(matches!(err, LookupError::NoCitiesDerived { ref province, .. } if province == "P-03"));
        assert!(matches!(session.state(), SelectionState::ProvinceSelected { .. }));
    }

    #[test]
    fn province_without_cities_blocks_detail_lookup() {
        let wb = Arc::new(Workbook::new(
            "m.xlsx",
            vec![
                Sheet::from_rows("Sheet0", vec![vec!["P-03", "Fars"]]),
                Sheet::from_rows("Sheet1", vec![vec!["P-01", "Tehran", "", "Karaj"]]),
                Sheet::from_rows("Sheet3", vec![vec!["Shiraz", "Wall A", "P-03"]]),
            ],
        ));
        let mut session = Session::open(wb, &Settings::default()).unwrap();
        assert!(session.select_province("P-03").is_err());

        let err = session.select_city("Shiraz").unwrap_err();
        assert_eq!(err.kind(), "no_cities_derived");
        assert!(matches!(session.request_details(), Err(LookupError::NoCitySelected)));
        assert!(session.details().is_none());
        assert!(matches!(session.state(), SelectionState::ProvinceSelected { .. }));
    }

    #[test]
    fn only_listed_cities_can_be_selected() {
        let mut session = session();
        session.select_province("P-01").unwrap();
        assert!(matches!(session.select_city("Sari"), Err(LookupError::UnknownCity(_))));
        assert!(matches!(session.select_city("  "), Err(LookupError::NoCitySelected)));

        session.select_city("c-01-02").unwrap();
        assert_eq!(session.state().city(), Some("C-01-02"));
        session.select_city("karaj").unwrap();
        assert_eq!(session.state().city(), Some("Karaj"));
    }

    #[test]
    fn province_missing_from_city_sheet_gets_sheet_wide_codes() {
        let mut session = session();
        let cities = session.select_province("Fars").unwrap();
        let codes: Vec<&str> = cities.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["C-01-01", "C-01-02", "C-02-01"]);
        assert!(cities.iter().all(|c| c.name == c.code));
    }

    #[test]
    fn unmatched_name_ends_in_details_empty() {
        let mut session = session();
        session.select_province("P-01").unwrap();
        session.select_city("Karaj").unwrap();
        let err = session.request_details().unwrap_err();
        assert_eq!(err.kind(), "no_details_found");
        assert!(matches!(session.state(), SelectionState::DetailsEmpty { .. }));
    }

    #[test]
    fn selections_out_of_order_are_rejected() {
        let mut session = session();
        assert!(matches!(session.select_city("Karaj"), Err(LookupError::NoProvinceSelected)));
        assert!(matches!(session.request_details(), Err(LookupError::NoProvinceSelected)));
        session.select_province("P-01").unwrap();
        assert!(matches!(session.request_details(), Err(LookupError::NoCitySelected)));
        assert!(matches!(session.select_province("P-42"), Err(LookupError::UnknownProvince(_))));
    }

    #[test]
    fn headered_sheet_without_codes_halts() {
        let wb = Arc::new(Workbook::new(
            "m.xlsx",
            vec![Sheet::from_rows("Sheet0", vec![vec!["Province", "Name"]])],
        ));
        let session = Session::open(wb, &Settings::default()).unwrap();
        assert!(matches!(session.provinces(), Err(LookupError::NoProvincesDerived { .. })));
    }

    #[test]
    fn city_list_is_truncated_to_limit() {
        let settings = Settings {
            city_list_limit: 1,
            ..Settings::default()
        };
        let mut session = Session::open(workbook(), &settings).unwrap();
        assert_eq!(session.select_province("P-01").unwrap().len(), 1);
    }
}
