//! Command-line interface definitions for fetch_pubs.
//!
//! Every option defaults to the values the site build has always used, so a
//! bare `fetch_pubs` run from the project root refreshes `publications.json`
//! from the department's EPrints exports.

use crate::models::Settings;
use clap::Parser;
use std::path::PathBuf;
use url::Url;

/// EPrints JSON exports listing the author's publications, consulted in order.
pub const DEFAULT_SOURCES: [&str; 2] = [
    "http://publications.eng.cam.ac.uk/cgi/exportview/creators/Wareham=3ARJ=3A=3A/JSON/Wareham=3ARJ=3A=3A.js",
    "http://publications.eng.cam.ac.uk/cgi/exportview/creators/Wareham=3AR=3A=3A/JSON/Wareham=3AR=3A=3A.js",
];

/// Where the sorted listing is cached.
pub const DEFAULT_OUTPUT: &str = "publications.json";

/// Command-line arguments for fetch_pubs.
///
/// # Examples
///
/// ```sh
/// # Refresh publications.json from the default sources
/// fetch_pubs
///
/// # Write somewhere else, keeping the numeric timestamp
/// fetch_pubs -o _data/publications.json --emit-timestamp
///
/// # Use a different export
/// fetch_pubs --source http://eprints.example.org/cgi/exportview/creators/Smith/JSON/Smith.js
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Publication source URL; repeat to consult several, in order
    #[arg(long = "source", value_name = "URL", default_values = DEFAULT_SOURCES)]
    pub sources: Vec<Url>,

    /// Output JSON file, replaced in full on success
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Keep the derived epoch-millisecond `timestamp` field in each record
    #[arg(long)]
    pub emit_timestamp: bool,
}

impl Cli {
    pub fn settings(&self) -> Settings {
        Settings {
            sources: self.sources.clone(),
            output: self.output.clone(),
            emit_timestamp: self.emit_timestamp,
        }
    }
}
