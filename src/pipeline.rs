use anyhow::{Context, Result};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::archive::RawArchive;
use crate::config::Settings;
use crate::fetch::Fetch;
use crate::ledger::Ledger;
use crate::parser::{self, extract::ExtractedFields};
use crate::table::{MasterTable, ProductRecord};

/// What happened to one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome {
    pub page: u32,
    pub anchors: usize,
    pub appended: usize,
    pub failed: bool,
}

impl PageOutcome {
    fn failed(page: u32) -> Self {
        Self {
            page,
            anchors: 0,
            appended: 0,
            failed: true,
        }
    }
}

/// Scrape stats returned after a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScrapeStats {
    pub pages: usize,
    pub failed: usize,
    pub anchors: usize,
    pub appended: usize,
}

impl ScrapeStats {
    fn record(&mut self, outcome: &PageOutcome) {
        self.pages += 1;
        self.anchors += outcome.anchors;
        self.appended += outcome.appended;
        if outcome.failed {
            self.failed += 1;
        }
    }
}

/// Fetch → archive → parse → extract → ledger filter → append, one page at a time.
pub struct PagePipeline<F> {
    fetcher: F,
    settings: Settings,
    ledger: Ledger,
    table: MasterTable,
    archive: RawArchive,
}

impl<F: Fetch> PagePipeline<F> {
    /// Build a pipeline whose ledger is seeded from the master table.
    pub fn new(fetcher: F, settings: Settings) -> Self {
        let table = MasterTable::new(settings.master_csv());
        let ledger = Ledger::load(table.path());
        Self::with_ledger(fetcher, settings, ledger)
    }

    pub fn with_ledger(fetcher: F, settings: Settings, ledger: Ledger) -> Self {
        let table = MasterTable::new(settings.master_csv());
        let archive = RawArchive::new(&settings.data_dir);
        Self {
            fetcher,
            settings,
            ledger,
            table,
            archive,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn table(&self) -> &MasterTable {
        &self.table
    }

    /// Scrape pages `1..=pages`, sleeping the configured delay between pages.
    pub async fn run(&mut self, keyword: &str, pages: u32) -> Result<ScrapeStats> {
        let pb = ProgressBar::new(u64::from(pages));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} pages ({msg})")?
                .progress_chars("=> "),
        );

        let mut stats = ScrapeStats::default();
        for page in 1..=pages {
            if page > 1 {
                tokio::time::sleep(self.settings.delay).await;
            }
            let outcome = self.scrape_page(keyword, page).await?;
            debug!("Page {} finished: {} new of {} anchors", outcome.page, outcome.appended, outcome.anchors);
            stats.record(&outcome);
            pb.set_message(format!("{} new", stats.appended));
            pb.inc(1);
        }

        pb.finish_and_clear();
        info!(
            "Scraped {} pages ({} failed), {} anchors, {} new rows",
            stats.pages, stats.failed, stats.anchors, stats.appended
        );
        Ok(stats)
    }

    /// Process one page. Fetch failures and non-2xx statuses yield a failed
    /// outcome with zero rows; only master-table I/O errors are returned.
    pub async fn scrape_page(&mut self, keyword: &str, page: u32) -> Result<PageOutcome> {
        let url = self.settings.page_url(keyword, page);
        info!("Fetching page {} -> {}", page, url);

        let fetched = match self.fetcher.fetch(&url).await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!("Request error on page {}: {}", page, e);
                return Ok(PageOutcome::failed(page));
            }
        };

        if fetched.is_success() || !fetched.body.is_empty() {
            self.archive_raw(keyword, page, &fetched.body);
        }
        if !fetched.is_success() {
            warn!("Non-2xx status {} on page {}", fetched.status, page);
            return Ok(PageOutcome::failed(page));
        }

        let listings = parser::extract_listings(
            &fetched.body,
            &fetched.final_url,
            self.settings.max_block_depth,
        );
        debug!("Page {}: {} product-like anchors", page, listings.anchors);

        let rows = self.accept(keyword, listings.fields);
        let appended = self
            .table
            .append(&rows)
            .with_context(|| format!("Failed to persist page {}", page))?;
        info!("Page {}: {} new rows", page, appended);

        Ok(PageOutcome {
            page,
            anchors: listings.anchors,
            appended,
            failed: false,
        })
    }

    /// Drop records without a URL or already in the ledger; register the rest.
    fn accept(&mut self, keyword: &str, fields: Vec<ExtractedFields>) -> Vec<ProductRecord> {
        fields
            .into_iter()
            .filter_map(|f| f.into_record(keyword, Utc::now()))
            .filter(|rec| self.ledger.insert(&rec.product_url))
            .collect()
    }

    fn archive_raw(&self, keyword: &str, page: u32, html: &str) {
        match self.archive.save(keyword, page, html) {
            Ok(path) => debug!("Saved raw HTML -> {}", path.display()),
            Err(e) => warn!("Could not archive page {}: {:#}", page, e),
        }
    }
}
