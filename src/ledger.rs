use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

static URL_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)proddetail|indiamart|http").unwrap());

const URL_COLUMN_HINTS: &[&str] = &["url", "link", "href"];

/// Product URLs already captured. Grows within a run, never shrinks, and is
/// rebuilt from the master table at every start.
#[derive(Debug, Default)]
pub struct Ledger {
    seen: HashSet<String>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the master table at `path`. A missing file gives an empty
    /// ledger; an unreadable one is warned about and also gives an empty ledger.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::new();
        }
        let seeded = std::fs::File::open(path)
            .map_err(csv::Error::from)
            .and_then(Self::seed_from_reader);
        match seeded {
            Ok(ledger) => {
                info!("Seeded ledger with {} URLs from {}", ledger.len(), path.display());
                ledger
            }
            Err(e) => {
                warn!("Could not read {} for dedupe, starting empty: {}", path.display(), e);
                Self::new()
            }
        }
    }

    /// Seed from CSV content. Uses the first column whose name suggests a URL;
    /// without one, takes every cell that looks like a marketplace URL.
    pub fn seed_from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = rdr.headers()?.clone();
        let url_col = headers.iter().position(|h| {
            let h = h.to_lowercase();
            URL_COLUMN_HINTS.iter().any(|hint| h.contains(hint))
        });

        let mut seen = HashSet::new();
        for record in rdr.records() {
            let record = record?;
            match url_col {
                Some(col) => {
                    if let Some(v) = record.get(col).filter(|v| !v.is_empty()) {
                        seen.insert(v.to_string());
                    }
                }
                None => seen.extend(
                    record
                        .iter()
                        .filter(|v| URL_VALUE_RE.is_match(v))
                        .map(str::to_string),
                ),
            }
        }
        Ok(Self { seen })
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    /// Record `url`; returns `false` if it was already present.
    pub fn insert(&mut self, url: &str) -> bool {
        if self.contains(url) {
            return false;
        }
        self.seen.insert(url.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
