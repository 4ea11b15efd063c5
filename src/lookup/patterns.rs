//! Cell classifiers shared by the lookup heuristics.

use std::sync::OnceLock;

use regex::Regex;

/// Labels that mark a column as holding measurements rather than places.
pub const BLACKLIST_KEYWORDS: &[&str] = &[
    "kwh",
    "u-value",
    "u value",
    "w/m",
    "energy",
    "thermal",
    "consumption",
    "انرژی",
    "مصرف",
    "حرارتی",
    "ضریب",
];

/// Placeholder texts that count as an empty name.
pub const NULL_MARKERS: &[&str] = &["nan", "none", "null", "-", "--", "n/a"];

fn province_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)P-\d{2}").expect("valid province pattern"))
}

fn city_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)C-\d{2}-\d{2}").expect("valid city pattern"))
}

fn city_full_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^C-\d{2}-\d{2}$").expect("valid city pattern"))
}

/// First province code in `text`, uppercased.
pub fn find_province_code(text: &str) -> Option<String> {
    province_regex().find(text).map(|m| m.as_str().to_uppercase())
}

/// Every province code in `text`, uppercased, in order of appearance.
pub fn find_all_province_codes(text: &str) -> Vec<String> {
    province_regex()
        .find_iter(text)
        .map(|m| m.as_str().to_uppercase())
        .collect()
}

pub fn has_province_code(text: &str) -> bool {
    province_regex().is_match(text)
}

/// First city code in `text`, uppercased.
pub fn find_city_code(text: &str) -> Option<String> {
    city_regex().find(text).map(|m| m.as_str().to_uppercase())
}

pub fn has_city_code(text: &str) -> bool {
    city_regex().is_match(text)
}

/// True when the whole (trimmed) text is exactly one city code.
pub fn is_city_code(text: &str) -> bool {
    city_full_regex().is_match(text.trim())
}

/// Arabic-script letters, which is what the Persian names are written in.
pub fn is_name_script(ch: char) -> bool {
    matches!(ch, '\u{0600}'..='\u{06FF}' | '\u{FB50}'..='\u{FDFF}' | '\u{FE70}'..='\u{FEFF}')
}

pub fn has_name_script(text: &str) -> bool {
    text.chars().any(|ch| is_name_script(ch) && !is_digit(ch))
}

fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit() || matches!(ch, '\u{0660}'..='\u{0669}' | '\u{06F0}'..='\u{06F9}')
}

/// Non-empty text made only of digits (Latin, Arabic-Indic or Persian),
/// whitespace and number punctuation.
pub fn is_numeric_like(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty()
        && trimmed.chars().any(is_digit)
        && trimmed
            .chars()
            .all(|ch| is_digit(ch) || ch.is_whitespace() || ".,-/%+٫٬".contains(ch))
}

pub fn is_blacklisted(text: &str) -> bool {
    let lowered = text.to_lowercase();
    BLACKLIST_KEYWORDS.iter().any(|k| lowered.contains(k))
}

pub fn is_null_marker(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || NULL_MARKERS.iter().any(|m| trimmed.eq_ignore_ascii_case(m))
}

/// Case-insensitive substring test; an empty needle never matches.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    !needle.is_empty() && haystack.to_lowercase().contains(&needle.to_lowercase())
}
