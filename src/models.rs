use serde::{Deserialize, Serialize};

/// How to specify dates in API queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateSpec {
    /// Single year like 2020
    Year(i32),
    /// Inclusive range like 2000..=2020
    Range { start: i32, end: i32 },
    /// Open-ended range like `2010:`, start through latest available
    From(i32),
}

impl DateSpec {
    /// Parse `YYYY`, `YYYY:YYYY` or `YYYY:`.
    pub fn parse(s: &str) -> Option<DateSpec> {
        match s.split_once(':') {
            Some((a, "")) => a.trim().parse().ok().map(DateSpec::From),
            Some((a, b)) => {
                let start = a.trim().parse().ok()?;
                let end = b.trim().parse().ok()?;
                Some(DateSpec::Range { start, end })
            }
            None => s.trim().parse().ok().map(DateSpec::Year),
        }
    }

    /// Render the literal range string sent to the API. Open-ended
    /// ranges are pinned to `latest` here, so one fetch always queries
    /// one fixed range.
    pub fn to_query_param(&self, latest: i32) -> String {
        match *self {
            DateSpec::Year(y) => y.to_string(),
            DateSpec::Range { start, end } => format!("{}:{}", start, end),
            DateSpec::From(start) => format!("{}:{}", start, latest),
        }
    }
}

/// Pagination envelope returned by the API (position 0 of the
/// response array). Small result sets may omit `pages`/`total`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default = "default_one")]
    pub page: u32,
    #[serde(default = "default_one")]
    pub pages: u32,
    /// Some responses encode `per_page` as a string, others as a number.
    /// Accept both and normalize to `u32`.
    #[serde(default, deserialize_with = "de_u32_from_string_or_number")]
    pub per_page: u32,
    #[serde(default)]
    pub total: u32,
}

fn default_one() -> u32 {
    1
}

/// Serde helper: parse `u32` from either a JSON number or a string.
fn de_u32_from_string_or_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct U32Visitor;

    impl<'de> Visitor<'de> for U32Visitor {
        type Value = u32;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a string or integer representing a non-negative number")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v as u32)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("negative value for u32"));
            }
            Ok(v as u32)
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            s.parse::<u32>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(U32Visitor)
}

/// One page of results: the envelope numbers plus the raw records.
/// `pages` is the authoritative count read from page 1.
#[derive(Debug, Clone)]
pub struct Page {
    pub number: u32,
    pub pages: u32,
    pub total: u32,
    pub records: Vec<serde_json::Value>,
}

/// Flat country metadata row. Every column is present in every row of
/// a fetch; missing nested values flatten to `None`, never to an
/// absent key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryRow {
    pub id: Option<String>,
    pub iso2_code: Option<String>,
    pub name: Option<String>,
    pub region_id: Option<String>,
    pub region: Option<String>,
    pub adminregion_id: Option<String>,
    pub adminregion: Option<String>,
    pub income_level_id: Option<String>,
    pub income_level: Option<String>,
    pub lending_type_id: Option<String>,
    pub lending_type: Option<String>,
    pub capital_city: Option<String>,
    pub longitude: Option<String>,
    pub latitude: Option<String>,
}

/// Flat indicator metadata row. `topics`/`topic_ids` hold the topic
/// array joined into a single `;`-delimited string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub id: Option<String>,
    pub name: Option<String>,
    pub unit: Option<String>,
    pub source_id: Option<String>,
    pub source: Option<String>,
    pub source_note: Option<String>,
    pub source_organization: Option<String>,
    pub topics: Option<String>,
    pub topic_ids: Option<String>,
}

/// Tidy observation row (one row = one country × indicator × date).
/// `value` stays `None` for missing data points so the date axis is
/// consistent when pivoting to wide form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub country_iso3: String,
    pub country_name: String,
    pub indicator_id: String,
    pub date: String,
    pub value: Option<f64>,
}
