//! Error taxonomy for a publications run.
//!
//! Every variant here is fatal: the run stops and the output file is left
//! untouched. Unparseable record dates are not errors; they are carried as a
//! missing sort key (see [`crate::models::NormalizedRecord`]).

use std::path::PathBuf;
use thiserror::Error;

/// Fatal failure of a publications run.
#[derive(Debug, Error)]
pub enum PubsError {
    /// The run was configured without any source URL.
    #[error("no publication sources configured")]
    NoSources,

    /// A source URL uses a scheme other than `http` or `https`.
    #[error("unsupported URL scheme for source {url}")]
    UnsupportedScheme { url: String },

    /// Connection or transport failure while talking to a source.
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The source answered with a non-success HTTP status.
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The response body could not be read as an array of records.
    #[error("could not parse publications from {url}: {reason}{}", truncation_hint(.truncated))]
    Parse {
        url: String,
        reason: String,
        truncated: bool,
    },

    /// The final collection could not be serialized.
    #[error("could not serialize publications: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Writing the output file failed.
    #[error("could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PubsError {
    /// Whether this failure came from reaching a source (transport, status
    /// or URL scheme) rather than from its content or the local filesystem.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            PubsError::Network { .. } | PubsError::Status { .. } | PubsError::UnsupportedScheme { .. }
        )
    }
}

fn truncation_hint(truncated: &bool) -> &'static str {
    if *truncated { " (body looks truncated)" } else { "" }
}
