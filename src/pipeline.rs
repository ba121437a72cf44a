//! The fetch → normalize → aggregate → write run.
//!
//! Sources are consulted strictly one after another and the first failure
//! ends the run before anything touches the output file.

use crate::error::PubsError;
use crate::fetcher::{FetchSource, fetch_records};
use crate::models::{NormalizedRecord, RunSummary, Settings};
use crate::normalize::{aggregate, normalize_record};
use crate::outputs::json::{render_publications, write_publications};
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{info, instrument, warn};
use url::Url;

/// Fetch and normalize every source, in order.
///
/// Returns one batch per source. The stream is sequential, so a failing
/// source stops the run before later sources are requested.
pub async fn collect_sources<F>(
    fetcher: &F,
    sources: &[Url],
) -> Result<Vec<Vec<NormalizedRecord>>, PubsError>
where
    F: FetchSource,
{
    if sources.is_empty() {
        return Err(PubsError::NoSources);
    }

    stream::iter(sources)
        .then(|url| async move {
            let records = fetch_records(fetcher, url).await?;
            Ok::<Vec<NormalizedRecord>, PubsError>(records.into_iter().map(normalize_record).collect())
        })
        .try_collect()
        .await
}

/// Run the whole pipeline and replace the output file.
#[instrument(level = "info", skip_all, fields(sources = settings.sources.len(), output = %settings.output.display()))]
pub async fn run<F>(fetcher: &F, settings: &Settings) -> Result<RunSummary, PubsError>
where
    F: FetchSource,
{
    let batches = collect_sources(fetcher, &settings.sources).await?;
    let publications = aggregate(batches);

    let records = publications.len();
    let undated = publications.iter().filter(|r| r.sort_key.is_none()).count();
    if undated > 0 {
        warn!(undated, "Some publications have unparseable dates and were placed last");
    }

    let json = render_publications(publications, settings.emit_timestamp)?;
    write_publications(&settings.output, &json).await?;
    info!(count = records, "Wrote publications");

    Ok(RunSummary {
        sources: settings.sources.len(),
        records,
        undated,
        output: settings.output.clone(),
    })
}
