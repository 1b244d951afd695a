mod embedded;
mod error;
mod extract;
mod fetch;
mod filter;
mod normalize;
mod pipeline;
mod records;
mod segment;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use crate::fetch::{Fetcher, HttpFetcher, SnapshotFetcher};
use crate::pipeline::RunOptions;

#[derive(Parser)]
#[command(
    name = "group_scraper",
    about = "Extract structured group records from rendered social-media pages"
)]
struct Cli {
    /// Directory the per-group JSON files are written to
    dest_dir: PathBuf,

    /// File with whitespace-separated group links, or a single link
    input_path: String,

    /// Pacing delay between page fetches, in seconds
    #[arg(long, default_value = "2")]
    sleep_time: u64,

    /// Path to a filter JSON file; without one, only the public check applies
    #[arg(long)]
    group_filter: Option<PathBuf>,

    /// Re-scrape groups whose output file already exists
    #[arg(long)]
    r#override: bool,

    /// Skip the advanced pass (topics, featured posts, admin enrichment)
    #[arg(long)]
    no_advanced: bool,

    /// Read page snapshots from this directory instead of fetching over HTTP
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // A broken filter file must fail here, before any page is touched.
    let clauses = match &cli.group_filter {
        None => Vec::new(),
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("could not find filter json at {}", path.display()))?;
            serde_json::from_str(&content).context("parsing filter json")?
        }
    };
    let group_filter = filter::compile(&clauses)?;

    let fetcher: Box<dyn Fetcher> = match &cli.snapshot_dir {
        Some(dir) => Box::new(SnapshotFetcher::new(dir.clone())),
        None => Box::new(HttpFetcher::new(Duration::from_secs(cli.sleep_time))?),
    };

    let opts = RunOptions {
        dest_dir: cli.dest_dir,
        input_path: cli.input_path,
        override_existing: cli.r#override,
        advanced: !cli.no_advanced,
    };
    pipeline::run(fetcher.as_ref(), &group_filter, &opts)
}
