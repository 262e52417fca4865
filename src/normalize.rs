//! Fixed flattening rules for the three resource types.
//!
//! Each function is total: malformed or missing leaves normalize to
//! `None`, never to an error, and never to an absent column. Nested
//! `{parent: {id, value}}` objects flatten to `<parent>_id` and
//! `<parent>` columns. When a record is already flat the same column
//! names are read back, so flattening a flat record is a no-op.

use crate::models::{CountryRow, IndicatorRow, Observation};
use serde_json::Value;

fn as_scalar(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Scalar field copied through as a string; null and containers
/// collapse to `None`.
fn scalar(rec: &Value, key: &str) -> Option<String> {
    rec.get(key).and_then(as_scalar)
}

/// `rec[parent][child]`, falling back to the flat column `flat` when
/// the nested object is absent.
fn nested(rec: &Value, parent: &str, child: &str, flat: &str) -> Option<String> {
    match rec.get(parent) {
        Some(Value::Object(obj)) => obj.get(child).and_then(as_scalar),
        _ => scalar(rec, flat),
    }
}

/// Join `rec[key][*][child]` into one `;`-delimited string. Arrays
/// never fan out into extra rows. Falls back to the flat column when
/// the array is absent.
fn joined(rec: &Value, key: &str, child: &str, flat: &str) -> Option<String> {
    match rec.get(key) {
        Some(Value::Array(items)) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| item.get(child).and_then(as_scalar))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            Some(parts.join(";"))
        }
        _ => scalar(rec, flat),
    }
}

/// Flatten one raw country record.
pub fn country_row(rec: &Value) -> CountryRow {
    CountryRow {
        id: scalar(rec, "id"),
        iso2_code: scalar(rec, "iso2Code").or_else(|| scalar(rec, "iso2_code")),
        name: scalar(rec, "name"),
        region_id: nested(rec, "region", "id", "region_id"),
        region: nested(rec, "region", "value", "region"),
        adminregion_id: nested(rec, "adminregion", "id", "adminregion_id"),
        adminregion: nested(rec, "adminregion", "value", "adminregion"),
        income_level_id: nested(rec, "incomeLevel", "id", "income_level_id"),
        income_level: nested(rec, "incomeLevel", "value", "income_level"),
        lending_type_id: nested(rec, "lendingType", "id", "lending_type_id"),
        lending_type: nested(rec, "lendingType", "value", "lending_type"),
        capital_city: scalar(rec, "capitalCity").or_else(|| scalar(rec, "capital_city")),
        longitude: scalar(rec, "longitude"),
        latitude: scalar(rec, "latitude"),
    }
}

/// Flatten one raw indicator metadata record. The catalogue endpoint
/// uses `name` for the display name, the data endpoint uses `value`;
/// both are accepted.
pub fn indicator_row(rec: &Value) -> IndicatorRow {
    IndicatorRow {
        id: scalar(rec, "id"),
        name: scalar(rec, "name").or_else(|| scalar(rec, "value")),
        unit: scalar(rec, "unit"),
        source_id: nested(rec, "source", "id", "source_id"),
        source: nested(rec, "source", "value", "source"),
        source_note: scalar(rec, "sourceNote").or_else(|| scalar(rec, "source_note")),
        source_organization: scalar(rec, "sourceOrganization")
            .or_else(|| scalar(rec, "source_organization")),
        topics: joined(rec, "topics", "value", "topics"),
        topic_ids: joined(rec, "topics", "id", "topic_ids"),
    }
}

/// Flatten one raw observation record into a tidy row. Identity fields
/// missing from the record become empty strings; a null `value` is
/// preserved as `None`, not dropped.
pub fn observation(rec: &Value) -> Observation {
    Observation {
        country_iso3: scalar(rec, "countryiso3code")
            .or_else(|| scalar(rec, "country_iso3"))
            .unwrap_or_default(),
        country_name: nested(rec, "country", "value", "country_name").unwrap_or_default(),
        indicator_id: nested(rec, "indicator", "id", "indicator_id").unwrap_or_default(),
        date: scalar(rec, "date").unwrap_or_default(),
        value: rec.get("value").and_then(Value::as_f64),
    }
}
