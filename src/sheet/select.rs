//! Decide which workbook sheet plays the province, city and detail role.
//!
//! Order per role: explicit override, name keyword, role digit in the name,
//! then position.

use serde::Serialize;

use crate::error::LookupError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetRole {
    Province,
    City,
    Detail,
}

impl SheetRole {
    pub const ALL: [SheetRole; 3] = [SheetRole::Province, SheetRole::City, SheetRole::Detail];

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Province => &["province", "استان"],
            Self::City => &["city", "شهر"],
            Self::Detail => &["detail", "wall", "جدول", "دیوار"],
        }
    }

    /// Conventional sheet names are Sheet0 / Sheet1 / Sheet3.
    fn digit(self) -> char {
        match self {
            Self::Province => '0',
            Self::City => '1',
            Self::Detail => '3',
        }
    }

    fn position(self) -> usize {
        match self {
            Self::Province => 0,
            Self::City => 1,
            Self::Detail => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Province => "province",
            Self::City => "city",
            Self::Detail => "detail",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "province" | "provinces" | "0" => Some(Self::Province),
            "city" | "cities" | "1" => Some(Self::City),
            "detail" | "details" | "3" => Some(Self::Detail),
            _ => None,
        }
    }
}

/// User-supplied sheet names that bypass detection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetOverrides {
    pub province: Option<String>,
    pub city: Option<String>,
    pub detail: Option<String>,
}

impl SheetOverrides {
    fn get(&self, role: SheetRole) -> Option<&str> {
        match role {
            SheetRole::Province => self.province.as_deref(),
            SheetRole::City => self.city.as_deref(),
            SheetRole::Detail => self.detail.as_deref(),
        }
    }
}

/// Sheet index per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SheetRoles {
    pub province: usize,
    pub city: usize,
    pub detail: usize,
}

impl SheetRoles {
    pub fn get(&self, role: SheetRole) -> usize {
        match role {
            SheetRole::Province => self.province,
            SheetRole::City => self.city,
            SheetRole::Detail => self.detail,
        }
    }

    /// Roles assigned to the sheet at `index`, for listings.
    pub fn roles_of(&self, index: usize) -> Vec<SheetRole> {
        SheetRole::ALL
            .into_iter()
            .filter(|role| self.get(*role) == index)
            .collect()
    }
}

pub fn select_sheets(names: &[String], overrides: &SheetOverrides) -> Result<SheetRoles, LookupError> {
    Ok(SheetRoles {
        province: select_one(names, SheetRole::Province, overrides)?,
        city: select_one(names, SheetRole::City, overrides)?,
        detail: select_one(names, SheetRole::Detail, overrides)?,
    })
}

fn select_one(
    names: &[String],
    role: SheetRole,
    overrides: &SheetOverrides,
) -> Result<usize, LookupError> {
    if let Some(wanted) = overrides.get(role) {
        return names
            .iter()
            .position(|n| n == wanted)
            .ok_or_else(|| LookupError::UnknownSheet(wanted.to_string()));
    }

    let lowered: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
    if let Some(index) = lowered
        .iter()
        .position(|n| role.keywords().iter().any(|k| n.contains(k)))
    {
        return Ok(index);
    }
    if let Some(index) = lowered.iter().position(|n| n.contains(role.digit())) {
        return Ok(index);
    }

    let fallback = role.position().min(names.len().saturating_sub(1));
    tracing::warn!(
        role = role.as_str(),
        sheet = names.get(fallback).map_or("", String::as_str),
        "no sheet name matched; using positional fallback"
    );
    Ok(fallback)
}
