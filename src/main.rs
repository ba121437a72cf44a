//! # fetch_pubs
//!
//! Refreshes the site's cached publications listing. Each configured EPrints
//! export is fetched in turn, its records get canonical ISO-8601 dates, and
//! the combined list is written newest first to `publications.json`.
//!
//! ## Usage
//!
//! ```sh
//! fetch_pubs                       # defaults: department exports -> ./publications.json
//! fetch_pubs -o _data/publications.json
//! RUST_LOG=debug fetch_pubs
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: GET each source, one at a time, and parse the body leniently
//! 2. **Normalizing**: derive a sort key from each record's `date`, rewrite it as ISO-8601
//! 3. **Aggregating**: concatenate all sources and sort newest first (undated last)
//! 4. **Output**: atomically replace the JSON file
//!
//! Any fetch or parse failure aborts the run with a non-zero exit status and
//! leaves the previous output in place.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod dates;
mod error;
mod fetcher;
mod lenient;
mod models;
mod normalize;
mod outputs;
mod pipeline;
mod utils;

use cli::Cli;
use fetcher::HttpFetcher;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("Fetching publications...");

    let args = Cli::parse();
    let settings = args.settings();
    debug!(sources = ?settings.sources, output = %settings.output.display(), "Parsed CLI arguments");

    let fetcher = HttpFetcher::new()?;
    let summary = match pipeline::run(&fetcher, &settings).await {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, network = e.is_network(), "Publication fetch failed; output left untouched");
            return Err(e.into());
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        sources = summary.sources,
        records = summary.records,
        undated = summary.undated,
        path = %summary.output.display(),
        millis = elapsed.as_millis() as u64,
        "Execution complete"
    );

    Ok(())
}
