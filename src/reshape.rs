//! Reshapes flat observation rows between long (tidy) and wide
//! (one column per indicator) layouts.

use crate::models::Observation;
use std::collections::HashMap;

/// Wide table: one row per (country, date), one value column per
/// indicator code observed in the input. Indicators absent from the
/// input never appear as columns.
#[derive(Debug, Clone, PartialEq)]
pub struct WideTable {
    /// Value column names, in first-seen input order.
    pub indicators: Vec<String>,
    pub rows: Vec<WideRow>,
}

/// One wide row; `values` is aligned with [`WideTable::indicators`].
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub country_iso3: String,
    pub country_name: String,
    pub date: String,
    pub values: Vec<Option<f64>>,
}

/// Long form is the normalizer's native output; field selection and
/// renaming already happened there, so this is a passthrough.
pub fn to_long(rows: Vec<Observation>) -> Vec<Observation> {
    rows
}

/// Pivot long rows to one row per (country, date).
///
/// Row order and column order both follow first appearance in the
/// input (stable, not sorted). A (country, date) pair missing an
/// indicator keeps a null cell for that column. Duplicate
/// (country, indicator, date) observations resolve last-write-wins.
pub fn to_wide(rows: &[Observation]) -> WideTable {
    let mut indicators: Vec<String> = Vec::new();
    let mut col: HashMap<&str, usize> = HashMap::new();
    for r in rows {
        if !col.contains_key(r.indicator_id.as_str()) {
            col.insert(&r.indicator_id, indicators.len());
            indicators.push(r.indicator_id.clone());
        }
    }

    let mut out: Vec<WideRow> = Vec::new();
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    for r in rows {
        let key = (r.country_iso3.as_str(), r.date.as_str());
        let at = *index.entry(key).or_insert_with(|| {
            out.push(WideRow {
                country_iso3: r.country_iso3.clone(),
                country_name: r.country_name.clone(),
                date: r.date.clone(),
                values: vec![None; indicators.len()],
            });
            out.len() - 1
        });
        out[at].values[col[r.indicator_id.as_str()]] = r.value;
    }

    WideTable {
        indicators,
        rows: out,
    }
}

impl WideTable {
    /// Unpivot back to long form: one row per (country, date) ×
    /// indicator column, explicit nulls included.
    pub fn to_long(&self) -> Vec<Observation> {
        let mut out = Vec::with_capacity(self.rows.len() * self.indicators.len());
        for row in &self.rows {
            for (i, indicator) in self.indicators.iter().enumerate() {
                out.push(Observation {
                    country_iso3: row.country_iso3.clone(),
                    country_name: row.country_name.clone(),
                    indicator_id: indicator.clone(),
                    date: row.date.clone(),
                    value: row.values[i],
                });
            }
        }
        out
    }

    /// True when the table has neither rows nor columns.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.indicators.is_empty()
    }
}
