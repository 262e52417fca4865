use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use wbq_rs::query::{self, CountryScope, Query};
use wbq_rs::{BatchConfig, Client, DateSpec, reshape, storage};

/// Rows printed to stdout when no output file is given.
const PREVIEW_ROWS: usize = 20;

#[derive(Parser, Debug)]
#[command(
    name = "wbq",
    version,
    about = "Fetch World Bank tabular data & metadata and reshape it for analysis"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch country metadata.
    Countries(CountriesArgs),
    /// Fetch indicator metadata.
    Indicators(IndicatorsArgs),
    /// Fetch indicator observations (wide by default, tidy with --long).
    Data(DataArgs),
    /// Run data pulls from a YAML job list.
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
struct CountriesArgs {
    /// Output file (.csv, .json, .yaml). Prints a preview if omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct IndicatorsArgs {
    /// Indicator codes separated by comma or semicolon. Fetches the
    /// whole catalogue if omitted.
    #[arg(long)]
    codes: Option<String>,
    /// Keep only indicators whose code or name contains this term
    /// (case-insensitive, applied client-side).
    #[arg(long)]
    search: Option<String>,
    /// Output file (.csv, .json, .yaml). Prints a preview if omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DataArgs {
    /// Indicator codes separated by comma or semicolon (e.g. SP.POP.TOTL)
    #[arg(short, long)]
    indicators: String,
    /// "all" or country codes separated by comma or semicolon (e.g. BRA,IND)
    #[arg(short, long, default_value = "all")]
    countries: String,
    /// Year (YYYY), range (YYYY:YYYY) or open range (YYYY:)
    #[arg(short = 'd', long)]
    date: Option<String>,
    /// Rows per page requested from the API.
    #[arg(long, default_value_t = query::DEFAULT_PER_PAGE)]
    per_page: u32,
    /// Emit long (tidy) rows instead of one column per indicator.
    #[arg(long, default_value_t = false)]
    long: bool,
    /// Output file (.csv, .json, .yaml). Prints a preview if omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// YAML config with a `jobs:` list.
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Countries(args) => cmd_countries(args),
        Command::Indicators(args) => cmd_indicators(args),
        Command::Data(args) => cmd_data(args),
        Command::Batch(args) => cmd_batch(args),
    }
}

fn cmd_countries(args: CountriesArgs) -> Result<()> {
    let rows = Client::default().fetch_countries()?;
    write_or_preview(&rows, args.out.as_deref())
}

fn cmd_indicators(args: IndicatorsArgs) -> Result<()> {
    let codes = args.codes.as_deref().map(query::parse_list).unwrap_or_default();
    let rows = Client::default().fetch_indicators(&codes, args.search.as_deref())?;
    write_or_preview(&rows, args.out.as_deref())
}

fn cmd_data(args: DataArgs) -> Result<()> {
    let client = Client::default();
    run_data_pull(
        &client,
        &args.indicators,
        &args.countries,
        args.date.as_deref(),
        args.per_page,
        args.long,
        args.out.as_deref(),
    )
}

fn cmd_batch(args: BatchArgs) -> Result<()> {
    let cfg = BatchConfig::load(&args.config)?;
    if cfg.jobs.is_empty() {
        eprintln!("No jobs in {}", args.config.display());
        return Ok(());
    }
    let client = Client::default();
    for job in &cfg.jobs {
        let out = match job.out.as_deref() {
            Some(path) if job.is_runnable() => path,
            _ => {
                log::warn!("skipping job {}: indicators/out required", job.label());
                continue;
            }
        };
        if let Some(dir) = out.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create output directory {}", dir.display()))?;
        }
        log::info!(
            "job {}: {} indicator(s) -> {}",
            job.label(),
            job.indicators.len(),
            out.display()
        );
        run_data_pull(
            &client,
            &job.indicators.join(","),
            &job.countries,
            job.date.as_deref(),
            query::DEFAULT_PER_PAGE,
            job.long,
            Some(out),
        )
        .with_context(|| format!("job {}", job.label()))?;
    }
    Ok(())
}

/// One fetch-normalize-reshape-write pass, shared by `data` and `batch`.
fn run_data_pull(
    client: &Client,
    indicators: &str,
    countries: &str,
    date: Option<&str>,
    per_page: u32,
    long: bool,
    out: Option<&Path>,
) -> Result<()> {
    let scope = CountryScope::parse(countries);
    let indicators = query::parse_list(indicators);
    let date = date
        .map(|s| {
            DateSpec::parse(s)
                .ok_or_else(|| anyhow::anyhow!("invalid date {s:?}, expected YYYY, YYYY:YYYY or YYYY:"))
        })
        .transpose()?;
    let query = Query::observations(&scope, &indicators, date)?.with_per_page(per_page);
    let rows = client.fetch_observations(&query)?;

    if long {
        let rows = reshape::to_long(rows);
        write_or_preview(&rows, out)
    } else {
        let table = reshape::to_wide(&rows);
        match out {
            Some(path) => {
                storage::save_wide(&table, path)?;
                eprintln!("Saved {} rows to {}", table.rows.len(), path.display());
                Ok(())
            }
            None => storage::print_wide_preview(&table, PREVIEW_ROWS),
        }
    }
}

fn write_or_preview<T: serde::Serialize>(rows: &[T], out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            storage::save_rows(rows, path)?;
            eprintln!("Saved {} rows to {}", rows.len(), path.display());
            Ok(())
        }
        None => storage::print_preview(rows, PREVIEW_ROWS),
    }
}
