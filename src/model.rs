//! Wire types for the catalog API and the derivations the UI needs from them.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Maximum description length surfaced on a card before truncation.
pub const DESCRIPTION_LIMIT: usize = 220;

pub const DESCRIPTION_PLACEHOLDER: &str = "No description available yet.";

/// Gen-ed categories shown before (or instead of) server metadata.
pub const FALLBACK_GENED_OPTIONS: &[&str] = &[
    "Advanced Composition",
    "Cultural Studies",
    "Humanities",
    "Natural Sciences",
    "Quantitative Reasoning",
    "Social & Behavioral Sciences",
];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Course {
    pub course_code: String,
    pub course_name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub credit_hours: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub gen_ed_requirements: Option<String>,
}

impl Course {
    /// Gen-ed tags derived from the raw delimited field.
    pub fn gen_ed_tags(&self) -> Vec<String> {
        self.gen_ed_requirements
            .as_deref()
            .map(split_gen_ed_tags)
            .unwrap_or_default()
    }

    /// Card blurb: the description truncated to [`DESCRIPTION_LIMIT`].
    pub fn blurb(&self) -> String {
        truncate_description(self.description.as_deref())
    }

    pub fn credit_label(&self) -> String {
        match self.credit_hours.as_deref() {
            Some(h) if !h.trim().is_empty() => h.trim().to_string(),
            _ => "N/A".to_string(),
        }
    }

    /// Relative link to the per-course detail page.
    pub fn detail_path(&self) -> String {
        course_detail_path(&self.course_code)
    }
}

/// Split a raw gen-ed field on `;`/`,`, trimming parts and dropping empties.
pub fn split_gen_ed_tags(raw: &str) -> Vec<String> {
    raw.split([';', ','])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Truncate at a word-agnostic boundary, appending an ellipsis; absent or
/// blank text yields the fixed placeholder.
pub fn truncate_description(text: Option<&str>) -> String {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return DESCRIPTION_PLACEHOLDER.to_string();
    };
    if text.chars().count() <= DESCRIPTION_LIMIT {
        return text.to_string();
    }
    let head: String = text.chars().take(DESCRIPTION_LIMIT).collect();
    format!("{}\u{2026}", head.trim_end())
}

// Everything encodeURIComponent escapes; keeps its unreserved marks.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn escape_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

pub fn course_detail_path(course_code: &str) -> String {
    format!("/course/{}", escape_component(course_code))
}

/// Snapshot of the filter state as search-endpoint query parameters.
/// Optional fields are omitted from the request entirely when `None`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchParams {
    pub major: Option<String>,
    pub geneds: Option<String>,
    pub q: Option<String>,
    pub limit: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "lenient_courses")]
    pub results: Vec<Course>,
    #[serde(default)]
    pub matches: usize,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CatalogMeta {
    #[serde(default)]
    pub departments: Vec<String>,
    #[serde(default)]
    pub geneds: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RecommendationRequest {
    pub major: String,
    pub goals: String,
    pub priorities: Vec<String>,
}

// A missing or non-array `results` is an empty window, not an error.
fn lenient_courses<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<Course>, D::Error> {
    let value = Value::deserialize(de)?;
    let Some(items) = value.as_array() else {
        return Ok(Vec::new());
    };
    Ok(items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect())
}

// Servers disagree on whether credit hours are strings or numbers.
fn lenient_scalar<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
