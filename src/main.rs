mod archive;
mod clean;
mod config;
mod fetch;
mod ledger;
mod parser;
mod pipeline;
mod table;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use config::Settings;
use fetch::HttpFetcher;
use ledger::Ledger;
use pipeline::PagePipeline;
use table::MasterTable;

#[derive(Parser)]
#[command(
    name = "b2b_listing_scraper",
    about = "Product listing scraper for B2B marketplace search results"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Directory holding the master table, cleaned table and raw HTML
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Search endpoint; `ss` (keyword) and `pg` (page) are appended
    #[arg(long, global = true)]
    search_url: Option<String>,
    /// Delay between page requests in milliseconds
    #[arg(long, global = true)]
    delay_ms: Option<u64>,
    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape search-result pages into the master table
    Scrape {
        /// Search keyword (prompted for when omitted)
        #[arg(short, long)]
        keyword: Option<String>,
        /// Number of pages to scrape
        #[arg(short, long, default_value = "3", value_parser = clap::value_parser!(u32).range(1..))]
        pages: u32,
    },
    /// Normalize the master table into the cleaned table
    Clean {
        /// Master table to read (default: <data-dir>/products.csv)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Cleaned table to write (default: <data-dir>/products_clean.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show master table statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let g = &cli.global;
    let settings = Settings::new(
        g.data_dir.clone(),
        g.search_url.as_deref(),
        g.delay_ms,
        g.timeout_secs,
    )?;

    let result = match cli.command {
        Commands::Scrape { keyword, pages } => {
            let keyword = match keyword {
                Some(k) => k.trim().to_string(),
                None => prompt_keyword()?,
            };
            if keyword.is_empty() {
                println!("No keyword provided, exiting.");
                return Ok(());
            }

            let fetcher = HttpFetcher::new(&settings).context("Failed to build HTTP client")?;
            let mut pipeline = PagePipeline::new(fetcher, settings);
            println!(
                "Existing product URLs in master table: {}",
                pipeline.ledger().len()
            );
            println!("Scraping {} page(s) for '{}'...", pages, keyword);

            let stats = pipeline.run(&keyword, pages).await?;
            println!(
                "Done: {} pages ({} failed), {} product anchors, {} new rows.",
                stats.pages, stats.failed, stats.anchors, stats.appended
            );
            match pipeline.table().count_rows() {
                Some(n) => println!("Master table rows: {}", n),
                None => println!("Master table not written yet."),
            }
            Ok(())
        }
        Commands::Clean { input, output } => {
            let input = input.unwrap_or_else(|| settings.master_csv());
            let output = output.unwrap_or_else(|| settings.cleaned_csv());
            let report = clean::run(&input, &output)?;
            report.print();
            println!("\nCleaned data saved to {}", output.display());
            Ok(())
        }
        Commands::Stats => {
            let table = MasterTable::new(settings.master_csv());
            match table.count_rows() {
                Some(rows) => {
                    let ledger = Ledger::load(table.path());
                    println!("Rows:          {}", rows);
                    println!("Distinct URLs: {}", ledger.len());
                }
                None => println!("No master table at {}.", table.path().display()),
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn prompt_keyword() -> anyhow::Result<String> {
    print!("Enter search keyword (e.g. electronics, shoes, furniture): ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
