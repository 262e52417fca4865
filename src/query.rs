//! Translates user-level filters (indicator codes, country scope, date
//! expressions) into the endpoint path and query parameters one fetch
//! uses. All validation happens here, before any network call.

use crate::error::Error;
use crate::models::DateSpec;
use chrono::{Datelike, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

/// Default rows per page requested from the API.
pub const DEFAULT_PER_PAGE: u32 = 1000;

// Allow -, _, . unescaped in codes (common for indicator ids)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc_join<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(|s| percent_encoding::utf8_percent_encode(s.trim(), SAFE).to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Split a comma/semicolon separated list, dropping empty items.
pub fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Drop repeated codes, keeping the first occurrence in order.
fn dedupe(codes: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    codes.into_iter().filter(|c| seen.insert(c.clone())).collect()
}

/// Which economies a data query covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryScope {
    /// Every economy the service knows (the `all` sentinel).
    All,
    /// Explicit codes, de-duplicated, first-occurrence order.
    Codes(Vec<String>),
}

impl CountryScope {
    /// Parse `all` (any case) or a comma/semicolon separated code list.
    pub fn parse(s: &str) -> CountryScope {
        if s.trim().eq_ignore_ascii_case("all") {
            CountryScope::All
        } else {
            CountryScope::Codes(dedupe(parse_list(s)))
        }
    }

    fn path_segment(&self) -> String {
        match self {
            CountryScope::All => "all".into(),
            CountryScope::Codes(codes) => enc_join(codes.iter().map(String::as_str)),
        }
    }
}

/// One immutable endpoint request: path plus query parameters, fixed
/// for the lifetime of a fetch. The fetcher appends only `page`.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub path: String,
    pub params: Vec<(String, String)>,
    pub per_page: u32,
}

impl Query {
    /// Observations for a set of indicators over a country scope.
    ///
    /// Open-ended dates (`YYYY:`) are resolved here, once, against the
    /// current UTC year, so every page of the fetch and every job of a
    /// batch sees the same literal range.
    pub fn observations(
        scope: &CountryScope,
        indicators: &[String],
        date: Option<DateSpec>,
    ) -> Result<Query, Error> {
        if indicators.is_empty() {
            return Err(Error::InvalidQuery(
                "at least one indicator code required".into(),
            ));
        }
        if matches!(scope, CountryScope::Codes(codes) if codes.is_empty()) {
            return Err(Error::InvalidQuery(
                "at least one country code required".into(),
            ));
        }
        let codes = dedupe(indicators.to_vec());
        let mut params = Vec::new();
        if let Some(d) = date {
            params.push(("date".to_string(), d.to_query_param(Utc::now().year())));
        }
        Ok(Query {
            path: format!(
                "country/{}/indicator/{}",
                scope.path_segment(),
                enc_join(codes.iter().map(String::as_str))
            ),
            params,
            per_page: DEFAULT_PER_PAGE,
        })
    }

    /// Country metadata for all economies.
    pub fn countries() -> Query {
        Query {
            path: "country".into(),
            params: Vec::new(),
            per_page: DEFAULT_PER_PAGE,
        }
    }

    /// Indicator metadata: the whole catalogue, or specific codes.
    pub fn indicators(codes: &[String]) -> Query {
        let path = if codes.is_empty() {
            "indicator".into()
        } else {
            let codes = dedupe(codes.to_vec());
            format!("indicator/{}", enc_join(codes.iter().map(String::as_str)))
        };
        Query {
            path,
            params: Vec::new(),
            per_page: DEFAULT_PER_PAGE,
        }
    }

    /// Override the page size (default 1000).
    pub fn with_per_page(mut self, per_page: u32) -> Query {
        self.per_page = per_page;
        self
    }

    /// Full URL for one page of this query.
    pub fn page_url(&self, base_url: &str, page: u32) -> String {
        let mut url = format!(
            "{}/{}?format=json&per_page={}&page={}",
            base_url, self.path, self.per_page, page
        );
        for (k, v) in &self.params {
            url.push_str(&format!("&{}={}", k, v));
        }
        url
    }
}
