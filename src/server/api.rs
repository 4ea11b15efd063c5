use std::collections::HashMap;

use serde::Serialize;

use crate::cli::resolve_sheet;
use crate::config::parse_count;
use crate::error::LookupError;
use crate::lookup::{CityRecord, ColumnRoles, DetailTable, ProvinceRecord, SelectionState};
use crate::server::AppState;
use crate::sheet::export::{export_file_name, write_csv, xlsx_bytes, XLSX_CONTENT_TYPE};
use crate::sheet::SheetRole;

const DEFAULT_DUMP_ROWS: usize = 50;

#[derive(Debug)]
pub enum ApiError {
    /// Required query parameter absent or blank.
    MissingParam(&'static str),
    Lookup(LookupError),
    Serialize(serde_json::Error),
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        Self::Lookup(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err)
    }
}

/// Decoded query parameters of a request path.
pub fn parse_query(path: &str) -> HashMap<String, String> {
    let query = path.split_once('?').map_or("", |(_, q)| q);
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

fn required<'a>(query: &'a HashMap<String, String>, key: &'static str) -> Result<&'a str, ApiError> {
    query
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::MissingParam(key))
}

pub fn health_payload() -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "wall-details-api",
        "version": env!("CARGO_PKG_VERSION"),
        "time": chrono::Utc::now().to_rfc3339(),
    }))?)
}

#[derive(Debug, Clone, Serialize)]
pub struct SheetListItem {
    pub index: usize,
    pub name: String,
    pub rows: usize,
    pub columns: usize,
    pub roles: Vec<SheetRole>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SheetsResponse {
    pub status: &'static str,
    pub source: String,
    pub sheets: Vec<SheetListItem>,
    pub city_columns: ColumnRoles,
}

pub fn sheets_payload(state: &mut AppState) -> Result<String, ApiError> {
    let source = state.settings.source.display().to_string();
    let session = state.session()?;
    let roles = session.sheet_roles();
    let sheets = session
        .workbook()
        .sheets
        .iter()
        .enumerate()
        .map(|(index, sheet)| SheetListItem {
            index,
            name: sheet.name.clone(),
            rows: sheet.height(),
            columns: sheet.width(),
            roles: roles.roles_of(index),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&SheetsResponse {
        status: "ok",
        source,
        sheets,
        city_columns: session.column_roles(),
    })?)
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvinceListItem {
    pub code: String,
    pub name: String,
    pub label: String,
}

impl From<&ProvinceRecord> for ProvinceListItem {
    fn from(p: &ProvinceRecord) -> Self {
        Self {
            code: p.code.clone(),
            name: p.name.clone(),
            label: p.label(),
        }
    }
}

pub fn provinces_payload(state: &mut AppState) -> Result<String, ApiError> {
    let session = state.session()?;
    let provinces: Vec<ProvinceListItem> = session
        .provinces()?
        .iter()
        .map(ProvinceListItem::from)
        .collect();
    Ok(serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "provinces": provinces,
    }))?)
}

#[derive(Debug, Clone, Serialize)]
pub struct CitiesResponse {
    pub status: &'static str,
    pub province: ProvinceListItem,
    pub cities: Vec<CityRecord>,
}

pub fn cities_payload(state: &mut AppState, path: &str) -> Result<String, ApiError> {
    let query = parse_query(path);
    let province = required(&query, "province")?;
    let session = state.session()?;
    let cities = session.select_province(province)?.to_vec();
    let province = session
        .state()
        .province()
        .map(ProvinceListItem::from)
        .ok_or(LookupError::NoProvinceSelected)?;
    Ok(serde_json::to_string_pretty(&CitiesResponse {
        status: "ok",
        province,
        cities,
    })?)
}

/// Run the full selection for the query's province and city.
fn run_details(state: &mut AppState, path: &str) -> Result<(String, DetailTable), ApiError> {
    let query = parse_query(path);
    let province = required(&query, "province")?;
    let city = required(&query, "city")?;
    let session = state.session()?;
    session.select_province(province)?;
    session.select_city(city)?;
    let city = session
        .state()
        .city()
        .map(str::to_string)
        .ok_or(LookupError::NoCitySelected)?;
    let table = session.request_details()?.clone();
    Ok((city, table))
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailsResponse {
    pub status: &'static str,
    pub selection: SelectionState,
    pub count: usize,
    pub export_file_name: String,
    pub table: DetailTable,
}

pub fn details_payload(state: &mut AppState, path: &str) -> Result<String, ApiError> {
    let (city, table) = run_details(state, path)?;
    let selection = state.session()?.state().clone();
    Ok(serde_json::to_string_pretty(&DetailsResponse {
        status: "ok",
        selection,
        count: table.len(),
        export_file_name: export_file_name(&city, "xlsx"),
        table,
    })?)
}

/// File download: (content type, file name, bytes).
pub struct ExportPayload {
    pub content_type: &'static str,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub fn export_payload(state: &mut AppState, path: &str) -> Result<ExportPayload, ApiError> {
    let as_csv = parse_query(path)
        .get("format")
        .is_some_and(|f| f.eq_ignore_ascii_case("csv"));
    let (city, table) = run_details(state, path)?;
    if as_csv {
        let mut bytes = Vec::new();
        write_csv(&table, &mut bytes)?;
        return Ok(ExportPayload {
            content_type: "text/csv; charset=utf-8",
            file_name: export_file_name(&city, "csv"),
            bytes,
        });
    }
    Ok(ExportPayload {
        content_type: XLSX_CONTENT_TYPE,
        file_name: export_file_name(&city, "xlsx"),
        bytes: xlsx_bytes(&table)?,
    })
}

/// Raw rows of one sheet, for when the heuristics come up empty.
pub fn dump_payload(state: &mut AppState, path: &str) -> Result<String, ApiError> {
    let query = parse_query(path);
    let which = required(&query, "sheet")?;
    let rows = parse_count(query.get("rows").cloned(), "rows", DEFAULT_DUMP_ROWS);
    let session = state.session()?;
    let sheet = resolve_sheet(session, which)?;
    Ok(serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "sheet": sheet.name,
        "rows": sheet.height(),
        "columns": sheet.width(),
        "preview": sheet.preview(rows),
    }))?)
}

pub fn state_payload(state: &mut AppState) -> Result<String, ApiError> {
    let session = state.session()?;
    Ok(serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "selection": session.state(),
        "cities": session.cities(),
    }))?)
}
