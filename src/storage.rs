//! Output writers: CSV, JSON and YAML for uniform row sets and wide
//! tables, with the format inferred from the file extension, plus the
//! stdout preview used when no output path is given. The core pipeline
//! itself does no file I/O; everything here consumes its results.

use crate::reshape::{WideRow, WideTable};
use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Output format, inferred from the file extension. CSV is the default
/// for unknown extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
    Yaml,
}

impl Format {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Format {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Format::Json,
            Some("yaml") | Some("yml") => Format::Yaml,
            _ => Format::Csv,
        }
    }
}

/// Save a uniform row set (observations, country or indicator
/// metadata) as CSV with a header row.
pub fn save_csv<T: Serialize, P: AsRef<Path>>(rows: &[T], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save rows as a pretty JSON array.
pub fn save_json<T: Serialize, P: AsRef<Path>>(rows: &[T], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(rows)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Save rows as a YAML sequence of records.
pub fn save_yaml<T: Serialize, P: AsRef<Path>>(rows: &[T], path: P) -> Result<()> {
    let f = File::create(path)?;
    serde_yaml::to_writer(f, rows)?;
    Ok(())
}

/// Write rows in the format inferred from `path`.
pub fn save_rows<T: Serialize, P: AsRef<Path>>(rows: &[T], path: P) -> Result<()> {
    match Format::from_path(&path) {
        Format::Csv => save_csv(rows, path),
        Format::Json => save_json(rows, path),
        Format::Yaml => save_yaml(rows, path),
    }
}

/// One wide row serialized as an ordered record: the three key columns
/// first, then one entry per indicator column. Keeps column order
/// stable across CSV, JSON and YAML.
struct WideRecord<'a> {
    table: &'a WideTable,
    row: &'a WideRow,
}

impl Serialize for WideRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3 + self.table.indicators.len()))?;
        map.serialize_entry("country_iso3", &self.row.country_iso3)?;
        map.serialize_entry("country_name", &self.row.country_name)?;
        map.serialize_entry("date", &self.row.date)?;
        for (i, indicator) in self.table.indicators.iter().enumerate() {
            map.serialize_entry(indicator, &self.row.values[i])?;
        }
        map.end()
    }
}

fn write_wide_csv<W: std::io::Write>(table: &WideTable, w: W, limit: Option<usize>) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(w);
    let mut header = vec![
        "country_iso3".to_string(),
        "country_name".to_string(),
        "date".to_string(),
    ];
    header.extend(table.indicators.iter().cloned());
    wtr.write_record(&header)?;
    let limit = limit.unwrap_or(table.rows.len());
    for row in table.rows.iter().take(limit) {
        let mut rec = vec![
            row.country_iso3.clone(),
            row.country_name.clone(),
            row.date.clone(),
        ];
        rec.extend(row.values.iter().map(|v| match v {
            Some(x) => x.to_string(),
            None => String::new(),
        }));
        wtr.write_record(&rec)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save a wide table in the format inferred from `path`: the three key
/// columns, then one column per indicator, missing cells left empty.
pub fn save_wide<P: AsRef<Path>>(table: &WideTable, path: P) -> Result<()> {
    match Format::from_path(&path) {
        Format::Csv => write_wide_csv(table, File::create(path)?, None),
        Format::Json => {
            let records: Vec<WideRecord> = table
                .rows
                .iter()
                .map(|row| WideRecord { table, row })
                .collect();
            let mut f = File::create(path)?;
            let s = serde_json::to_string_pretty(&records)?;
            f.write_all(s.as_bytes())?;
            Ok(())
        }
        Format::Yaml => {
            let records: Vec<WideRecord> = table
                .rows
                .iter()
                .map(|row| WideRecord { table, row })
                .collect();
            serde_yaml::to_writer(File::create(path)?, &records)?;
            Ok(())
        }
    }
}

/// Print the first `limit` rows to stdout as CSV with a row-count
/// trailer.
pub fn print_preview<T: Serialize>(rows: &[T], limit: usize) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(std::io::stdout());
    for r in rows.iter().take(limit) {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    if rows.len() > limit {
        println!("... {} more rows", rows.len() - limit);
    }
    Ok(())
}

/// Wide-table counterpart of [`print_preview`].
pub fn print_wide_preview(table: &WideTable, limit: usize) -> Result<()> {
    write_wide_csv(table, std::io::stdout(), Some(limit))?;
    if table.rows.len() > limit {
        println!("... {} more rows", table.rows.len() - limit);
    }
    Ok(())
}
