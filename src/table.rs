use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

// ── Rows ──

/// One accepted listing, as stored in the master table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(default, deserialize_with = "lenient_time")]
    pub scrape_time: Option<DateTime<Utc>>,
    pub keyword: String,
    pub product_name: Option<String>,
    pub product_url: String,
    pub seller: Option<String>,
    pub location: Option<String>,
    pub price_text: Option<String>,
}

/// Master-table row after the cleaning pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedProductRecord {
    #[serde(default, deserialize_with = "lenient_time")]
    pub scrape_time: Option<DateTime<Utc>>,
    pub keyword: String,
    pub product_name: Option<String>,
    pub product_url: String,
    pub seller: Option<String>,
    pub location: Option<String>,
    pub price_text: Option<String>,
    pub price_value: Option<f64>,
}

/// RFC 3339, or a naive ISO time taken as UTC. Anything else reads as absent.
fn lenient_time<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|t| t.and_utc())
}

// ── Master table ──

/// Append-only CSV log of every accepted `ProductRecord`.
pub struct MasterTable {
    path: PathBuf,
}

impl MasterTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append rows, writing the header only when the file is new or empty.
    /// Returns the number of rows written.
    pub fn append(&self, rows: &[ProductRecord]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let has_header = fs::metadata(&self.path).map(|m| m.len() > 0).unwrap_or(false);
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(!has_header)
            .from_writer(file);
        for row in rows {
            writer
                .serialize(row)
                .with_context(|| format!("Failed to append to {}", self.path.display()))?;
        }
        writer.flush()?;
        Ok(rows.len())
    }

    /// Read every row. Rows whose CSV structure cannot be read (too few
    /// fields, bad UTF-8) are skipped and counted.
    pub fn read_all(&self) -> Result<(Vec<ProductRecord>, usize)> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        let mut rows = Vec::new();
        let mut skipped = 0usize;
        for (i, result) in reader.deserialize::<ProductRecord>().enumerate() {
            match result {
                Ok(row) => rows.push(row),
                Err(e) => {
                    warn!("Skipping unreadable row {} in {}: {}", i + 1, self.path.display(), e);
                    skipped += 1;
                }
            }
        }
        Ok((rows, skipped))
    }

    /// Number of data rows, or `None` when the table cannot be read.
    pub fn count_rows(&self) -> Option<usize> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .ok()?;
        Some(reader.records().filter(|r| r.is_ok()).count())
    }
}

/// Write the cleaned table wholesale, replacing any previous file.
pub fn write_cleaned(path: &Path, rows: &[CleanedProductRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
