//! wbq-rs
//!
//! A lightweight Rust library for retrieving World Bank tabular data
//! (country lists, indicator metadata, time-series observations) and
//! reshaping it into analysis-ready tables. Pairs with the `wbq` CLI.
//!
//! ### Features
//! - Paginated fetch with bounded retry/backoff for one or more
//!   indicators over any country scope and year range
//! - Nested JSON records normalized into flat, uniform rows
//! - Long (tidy) or wide (one column per indicator) layouts
//! - Save as CSV, JSON or YAML
//! - YAML-driven batch pulls
//!
//! ### Example
//! ```no_run
//! use wbq_rs::query::{CountryScope, Query};
//! use wbq_rs::{Client, DateSpec};
//!
//! let client = Client::default();
//! let query = Query::observations(
//!     &CountryScope::parse("BRA,IND"),
//!     &["SP.POP.TOTL".into()],
//!     DateSpec::parse("2010:2020"),
//! )?;
//! let rows = client.fetch_observations(&query)?;
//! let wide = wbq_rs::reshape::to_wide(&rows);
//! wbq_rs::storage::save_wide(&wide, "population.csv")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod query;
pub mod reshape;
pub mod storage;

pub use api::{Client, Pages, RetryPolicy};
pub use config::BatchConfig;
pub use error::Error;
pub use models::{DateSpec, Meta, Observation, Page};
pub use reshape::{WideRow, WideTable};
