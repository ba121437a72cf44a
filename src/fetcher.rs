//! Retrieval of publication listings from their sources.
//!
//! # Architecture
//!
//! - [`FetchSource`]: core trait, "give me the body behind this URL"
//! - [`HttpFetcher`]: the production implementation on top of `reqwest`
//! - [`fetch_records`]: fetch one source and parse its body into records
//!
//! Requests carry no timeout and are never retried: a source that stops
//! answering stalls the run, and a source that fails ends it.

use crate::error::PubsError;
use crate::lenient::parse_records;
use crate::models::PublicationRecord;
use crate::utils::truncate_for_log;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Something that can hand back the full body behind a source URL.
pub trait FetchSource {
    /// Fetch the complete response body for `url`.
    async fn fetch(&self, url: &Url) -> Result<String, PubsError>;
}

/// HTTP(S) fetcher sharing one connection pool across sources.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher identifying itself as this crate.
    pub fn new() -> Result<Self, PubsError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| PubsError::Network {
                url: String::new(),
                source,
            })?;
        Ok(Self { client })
    }
}

impl FetchSource for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<String, PubsError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PubsError::UnsupportedScheme {
                url: url.to_string(),
            });
        }

        let network = |source: reqwest::Error| PubsError::Network {
            url: url.to_string(),
            source,
        };

        let t0 = Instant::now();
        let res = self.client.get(url.clone()).send().await.map_err(network)?;
        let status = res.status();
        if !status.is_success() {
            warn!(%status, "Source answered with a failure status");
            return Err(PubsError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = res.text().await.map_err(network)?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Read response body"
        );
        Ok(body)
    }
}

/// Fetch one source and parse its body into records.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_records<F>(fetcher: &F, url: &Url) -> Result<Vec<PublicationRecord>, PubsError>
where
    F: FetchSource,
{
    info!("GET-ing source");
    let body = fetcher.fetch(url).await?;

    match parse_records(&body) {
        Ok(records) => {
            info!(count = records.len(), "Got publication(s)");
            Ok(records)
        }
        Err(e) => {
            debug!(body_preview = %truncate_for_log(&body, 300), "Unparseable body");
            Err(PubsError::Parse {
                url: url.to_string(),
                reason: e.reason,
                truncated: e.truncated,
            })
        }
    }
}
