//! Synchronous client for the **World Bank Indicators API (v2)**.
//!
//! The endpoint family returns a `[meta, data]` envelope where `meta`
//! carries `{page, pages, per_page, total}` and `data` is an array of
//! records. [`Client::pages`] walks all pages lazily and strictly
//! sequentially (page `N+1` is only known once page 1's envelope has
//! been read); each page request is retried per [`RetryPolicy`].
//!
//! ### Notes
//! - The API sometimes serializes `per_page` as a **string**; both
//!   string and number are accepted.
//! - Invalid codes are reported by the service as a `message` object in
//!   envelope position 0 with HTTP 200; that surfaces as
//!   [`Error::UpstreamRejected`], not as a parse failure.
//! - A fetch is all-or-nothing: the collecting fetch methods discard
//!   earlier pages when a later page fails.
//!
//! Typical usage:
//! ```no_run
//! # use wbq_rs::query::{CountryScope, Query};
//! # use wbq_rs::{Client, DateSpec};
//! let client = Client::default();
//! let query = Query::observations(
//!     &CountryScope::parse("BRA,IND"),
//!     &["SP.POP.TOTL".into()],
//!     DateSpec::parse("2010:2020"),
//! )?;
//! let rows = client.fetch_observations(&query)?;
//! # Ok::<(), wbq_rs::Error>(())
//! ```

use crate::error::Error;
use crate::models::{CountryRow, IndicatorRow, Meta, Observation, Page};
use crate::normalize;
use crate::query::Query;
use rand::Rng;
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::time::Duration;

/// Retry/backoff policy for individual page requests.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per page, first try included.
    pub max_attempts: u32,
    /// Delay before the first retry; doubled per subsequent attempt.
    pub base_delay: Duration,
    /// Upper bound on the exponential part of any delay.
    pub max_delay: Duration,
    /// Add up to 50% random extra delay, spreading out concurrent
    /// callers hitting the shared rate budget.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Zero-delay policy, for exercising retry behavior in tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: false,
        }
    }

    /// Delay before the retry that follows failed attempt `attempt`
    /// (1-based): base doubled per attempt, capped, plus jitter.
    fn delay(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(1u32 << (attempt - 1).min(16));
        let capped = exp.min(self.max_delay);
        if self.jitter && capped > Duration::ZERO {
            capped + capped.mul_f64(rand::thread_rng().gen_range(0.0..0.5))
        } else {
            capped
        }
    }
}

/// Synchronous client: base URL, HTTP client and retry policy.
#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    http: HttpClient,
    retry: RetryPolicy,
}

impl Default for Client {
    fn default() -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30)) // total request timeout
            .connect_timeout(Duration::from_secs(10)) // connect timeout
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("wbq_rs/", env!("CARGO_PKG_VERSION"))) // set user agent
            .build()
            .expect("reqwest client build");
        Self {
            base_url: "https://api.worldbank.org/v2".into(),
            http,
            retry: RetryPolicy::default(),
        }
    }
}

impl Client {
    /// Client with a custom retry policy.
    pub fn with_retry(retry: RetryPolicy) -> Self {
        Self {
            retry,
            ..Self::default()
        }
    }

    /// Walk all pages of `query` lazily, page 1 first, then
    /// `2..=pages` as reported by page 1's envelope. The iterator is
    /// fused: after the first error it yields nothing further and
    /// issues no more requests. Dropping it unconsumed also stops all
    /// network traffic.
    pub fn pages<'a>(&'a self, query: &'a Query) -> Pages<'a> {
        Pages::with_transport(self.retry.clone(), move |page| self.get_page(query, page))
    }

    /// Fetch country metadata for all economies as flat rows.
    pub fn fetch_countries(&self) -> Result<Vec<CountryRow>, Error> {
        self.collect(&Query::countries(), normalize::country_row)
    }

    /// Fetch indicator metadata (the whole catalogue when `codes` is
    /// empty), optionally filtered client-side by a case-insensitive
    /// substring of the code or name.
    pub fn fetch_indicators(
        &self,
        codes: &[String],
        search: Option<&str>,
    ) -> Result<Vec<IndicatorRow>, Error> {
        let mut rows = self.collect(&Query::indicators(codes), normalize::indicator_row)?;
        if let Some(term) = search {
            let term = term.to_lowercase();
            rows.retain(|r| {
                r.id.as_deref()
                    .is_some_and(|s| s.to_lowercase().contains(&term))
                    || r.name
                        .as_deref()
                        .is_some_and(|s| s.to_lowercase().contains(&term))
            });
        }
        Ok(rows)
    }

    /// Fetch observations for a prepared query as tidy rows. All pages
    /// are collected before returning; a failed page fails the fetch.
    pub fn fetch_observations(&self, query: &Query) -> Result<Vec<Observation>, Error> {
        self.collect(query, normalize::observation)
    }

    fn collect<T>(&self, query: &Query, row: fn(&Value) -> T) -> Result<Vec<T>, Error> {
        let mut out = Vec::new();
        for page in self.pages(query) {
            let page = page?;
            out.extend(page.records.iter().map(row));
        }
        Ok(out)
    }

    /// Perform one GET and split the `[meta, data]` envelope.
    fn get_page(&self, query: &Query, page: u32) -> Result<(Meta, Vec<Value>), Error> {
        let url = query.page_url(&self.base_url, page);
        log::debug!("GET {url}");
        let resp = self.http.get(&url).send()?;
        let status = resp.status();
        if status.is_success() {
            let body = resp.text()?;
            let v: Value = serde_json::from_str(&body)?;
            parse_envelope(&v)
        } else if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            Err(Error::Http {
                status: status.as_u16(),
            })
        } else {
            let body = resp.text().unwrap_or_default();
            Err(Error::UpstreamRejected {
                status: status.as_u16(),
                body: excerpt(&body),
            })
        }
    }
}

/// Split the response array into envelope and records. A `message`
/// object in position 0 is how the service reports bad codes.
fn parse_envelope(v: &Value) -> Result<(Meta, Vec<Value>), Error> {
    let arr = v
        .as_array()
        .ok_or_else(|| Error::Envelope("not a top-level array".into()))?;
    let first = arr
        .first()
        .ok_or_else(|| Error::Envelope("empty array".into()))?;
    if first.get("message").is_some() {
        return Err(Error::UpstreamRejected {
            status: 200,
            body: excerpt(&first.to_string()),
        });
    }
    let meta: Meta = serde_json::from_value(first.clone())?;
    let records = match arr.get(1) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    };
    Ok((meta, records))
}

/// Bounded slice of an error body for diagnostics.
fn excerpt(body: &str) -> String {
    body.chars().take(200).collect()
}

type Transport<'a> = Box<dyn FnMut(u32) -> Result<(Meta, Vec<Value>), Error> + 'a>;

/// Lazy page sequence, see [`Client::pages`]. Not restartable: a fresh
/// call to `pages` re-fetches from page 1.
pub struct Pages<'a> {
    transport: Transport<'a>,
    retry: RetryPolicy,
    next_page: u32,
    total_pages: Option<u32>,
    done: bool,
}

impl<'a> Pages<'a> {
    /// Page walker over an arbitrary transport. [`Client::pages`] plugs
    /// in HTTP; tests drive pagination and retry behavior offline.
    pub fn with_transport(
        retry: RetryPolicy,
        transport: impl FnMut(u32) -> Result<(Meta, Vec<Value>), Error> + 'a,
    ) -> Self {
        Self {
            transport: Box::new(transport),
            retry,
            next_page: 1,
            total_pages: None,
            done: false,
        }
    }

    /// One page request under the retry policy. Retry counters live
    /// here, scoped to the request, and are discarded afterwards.
    fn request(&mut self, page: u32) -> Result<(Meta, Vec<Value>), Error> {
        let mut attempt = 1u32;
        loop {
            match (self.transport)(page) {
                Ok(v) => return Ok(v),
                Err(e) if e.is_retryable() && attempt < self.retry.max_attempts => {
                    log::warn!(
                        "page {page}: attempt {attempt}/{} failed: {e}, retrying",
                        self.retry.max_attempts
                    );
                    std::thread::sleep(self.retry.delay(attempt));
                    attempt += 1;
                }
                Err(e) if e.is_retryable() => {
                    return Err(Error::FetchExhausted {
                        page,
                        attempts: attempt,
                        cause: Box::new(e),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Iterator for Pages<'_> {
    type Item = Result<Page, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let number = self.next_page;
        let (meta, records) = match self.request(number) {
            Ok(v) => v,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        // Page 1's envelope is authoritative; later pages' counts are ignored.
        let pages = *self.total_pages.get_or_insert_with(|| meta.pages.max(1));
        if number == 1 && meta.total == 0 && records.is_empty() {
            // Empty result set: a valid terminal state, not an error.
            self.done = true;
            return None;
        }
        self.next_page = number + 1;
        if self.next_page > pages {
            self.done = true;
        }
        Some(Ok(Page {
            number,
            pages,
            total: meta.total,
            records,
        }))
    }
}
