use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

pub const DATA_DIR: &str = "data";
pub const MASTER_CSV: &str = "products.csv";
pub const CLEANED_CSV: &str = "products_clean.csv";
pub const SEARCH_URL: &str = "https://dir.indiamart.com/search.mp";
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";
pub const POLITE_DELAY_MS: u64 = 1800;
pub const TIMEOUT_SECS: u64 = 20;
pub const MAX_BLOCK_DEPTH: usize = 6;

/// Runtime settings shared by the scraping and cleaning commands.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub search_url: Url,
    pub delay: Duration,
    pub timeout: Duration,
    pub user_agent: String,
    pub max_block_depth: usize,
}

impl Settings {
    pub fn new(
        data_dir: Option<PathBuf>,
        search_url: Option<&str>,
        delay_ms: Option<u64>,
        timeout_secs: Option<u64>,
    ) -> Result<Self> {
        let search_url = Url::parse(search_url.unwrap_or(SEARCH_URL))
            .with_context(|| format!("Invalid search URL: {}", search_url.unwrap_or(SEARCH_URL)))?;

        Ok(Self {
            data_dir: data_dir.unwrap_or_else(|| PathBuf::from(DATA_DIR)),
            search_url,
            delay: Duration::from_millis(delay_ms.unwrap_or(POLITE_DELAY_MS)),
            timeout: Duration::from_secs(timeout_secs.unwrap_or(TIMEOUT_SECS)),
            user_agent: USER_AGENT.to_string(),
            max_block_depth: MAX_BLOCK_DEPTH,
        })
    }

    pub fn master_csv(&self) -> PathBuf {
        self.data_dir.join(MASTER_CSV)
    }

    pub fn cleaned_csv(&self) -> PathBuf {
        self.data_dir.join(CLEANED_CSV)
    }

    /// Search URL for one keyword/page pair: `?ss=<keyword>&pg=<page>`.
    pub fn page_url(&self, keyword: &str, page: u32) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("ss", keyword)
            .append_pair("pg", &page.to_string());
        url
    }
}
