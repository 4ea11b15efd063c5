use std::path::PathBuf;

use thiserror::Error;

/// Every failure the lookup pipeline can surface to a user.
///
/// Heuristic misses are never raised inside [`crate::lookup`]; they come back as
/// empty collections and are turned into the `No*` variants at the session,
/// CLI or HTTP boundary.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("source file not found: {}", path.display())]
    SourceMissing { path: PathBuf },

    #[error("failed to read source file {}: {cause}", path.display())]
    SourceUnreadable { path: PathBuf, cause: String },

    #[error("no provinces could be derived from sheet '{sheet}'; check the province sheet layout")]
    NoProvincesDerived { sheet: String },

    #[error("no cities could be derived for province '{province}' from sheet '{sheet}'")]
    NoCitiesDerived { province: String, sheet: String },

    #[error(
        "no detail rows in sheet '{sheet}' match city '{city}' (province '{province}'); \
         verify that codes and names are written the same way in both sheets"
    )]
    NoDetailsFound {
        province: String,
        city: String,
        sheet: String,
    },

    #[error("sheet '{0}' does not exist in the workbook")]
    UnknownSheet(String),

    #[error("province '{0}' is not in the province list")]
    UnknownProvince(String),

    #[error("city '{0}' is not in the city list of the selected province")]
    UnknownCity(String),

    #[error("select a province first")]
    NoProvinceSelected,

    #[error("select a city first")]
    NoCitySelected,

    #[error("export failed: {0}")]
    Export(String),
}

impl LookupError {
    /// Stable snake_case tag used in JSON error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SourceMissing { .. } => "source_missing",
            Self::SourceUnreadable { .. } => "source_unreadable",
            Self::NoProvincesDerived { .. } => "no_provinces_derived",
            Self::NoCitiesDerived { .. } => "no_cities_derived",
            Self::NoDetailsFound { .. } => "no_details_found",
            Self::UnknownSheet(_) => "unknown_sheet",
            Self::UnknownProvince(_) => "unknown_province",
            Self::UnknownCity(_) => "unknown_city",
            Self::NoProvinceSelected => "no_province_selected",
            Self::NoCitySelected => "no_city_selected",
            Self::Export(_) => "export_failed",
        }
    }

    /// File-level failures abort the whole pipeline; everything else is a
    /// recoverable selection outcome.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::SourceMissing { .. } | Self::SourceUnreadable { .. })
    }
}

impl From<rust_xlsxwriter::XlsxError> for LookupError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Export(err.to_string())
    }
}

impl From<csv::Error> for LookupError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}
