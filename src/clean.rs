use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use tracing::info;

use crate::table::{self, CleanedProductRecord, MasterTable, ProductRecord};

static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\d,]+").unwrap());

const PRICE_SENTINELS: &[&str] = &["nan", "none"];

/// Row counts and per-column missing values from one cleaning run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanReport {
    pub input_rows: usize,
    pub skipped_rows: usize,
    pub duplicates_removed: usize,
    pub output_rows: usize,
    pub missing: Vec<(&'static str, usize)>,
}

impl CleanReport {
    pub fn print(&self) {
        println!("Original rows:      {}", self.input_rows);
        if self.skipped_rows > 0 {
            println!("Unreadable rows:    {}", self.skipped_rows);
        }
        println!("Duplicates removed: {}", self.duplicates_removed);
        println!("Final rows:         {}", self.output_rows);
        println!("\nMissing values:");
        for (column, count) in &self.missing {
            println!("  {:<14} {}", column, count);
        }
    }
}

/// Read the master table, clean it, and overwrite `output` with the result.
pub fn run(input: &Path, output: &Path) -> Result<CleanReport> {
    let (records, skipped) = MasterTable::new(input).read_all()?;
    info!("Cleaning {} rows from {}", records.len(), input.display());

    let (rows, mut report) = clean_records(records);
    report.skipped_rows = skipped;
    report.input_rows += skipped;

    table::write_cleaned(output, &rows)?;
    info!("Cleaned data saved to {}", output.display());
    Ok(report)
}

/// Normalize every record, then drop later rows repeating an earlier URL.
pub fn clean_records(records: Vec<ProductRecord>) -> (Vec<CleanedProductRecord>, CleanReport) {
    let input_rows = records.len();
    let mut seen = HashSet::new();
    let rows: Vec<_> = records
        .into_iter()
        .map(clean_record)
        .filter(|r| seen.insert(r.product_url.clone()))
        .collect();

    let report = CleanReport {
        input_rows,
        skipped_rows: 0,
        duplicates_removed: input_rows - rows.len(),
        output_rows: rows.len(),
        missing: missing_counts(&rows),
    };
    (rows, report)
}

pub fn clean_record(record: ProductRecord) -> CleanedProductRecord {
    let price_text = present(record.price_text);
    let price_value = parse_price(price_text.as_deref());
    CleanedProductRecord {
        scrape_time: record.scrape_time,
        keyword: record.keyword.trim().to_string(),
        product_name: present(record.product_name),
        product_url: record.product_url.trim().to_string(),
        seller: present(record.seller),
        location: present(record.location)
            .filter(|l| !l.eq_ignore_ascii_case("nan"))
            .map(|l| title_case(&l)),
        price_text,
        price_value,
    }
}

/// First run of digits and commas, commas removed, as a number.
pub fn parse_price(text: Option<&str>) -> Option<f64> {
    let text = text?.trim();
    if text.is_empty() || PRICE_SENTINELS.contains(&text.to_lowercase().as_str()) {
        return None;
    }
    let digits = DIGITS_RE.find(text)?.as_str().replace(',', "");
    digits.parse().ok()
}

/// Uppercase the first letter of each alphabetic run, lowercase the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Trimmed value, or `None` for blanks.
fn present(value: Option<String>) -> Option<String> {
    let v = value?.trim().to_string();
    (!v.is_empty()).then_some(v)
}

fn missing_counts(rows: &[CleanedProductRecord]) -> Vec<(&'static str, usize)> {
    let count = |f: fn(&CleanedProductRecord) -> bool| rows.iter().filter(|r| f(r)).count();
    vec![
        ("product_name", count(|r| r.product_name.is_none())),
        ("product_url", count(|r| r.product_url.is_empty())),
        ("seller", count(|r| r.seller.is_none())),
        ("location", count(|r| r.location.is_none())),
        ("price_text", count(|r| r.price_text.is_none())),
        ("price_value", count(|r| r.price_value.is_none())),
    ]
}
