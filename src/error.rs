//! Error taxonomy for the crawl-and-fetch workflow.
//!
//! Application glue (CLI, terminal setup, exports) stays on `anyhow`; these typed errors only
//! cover what the orchestrator must tell apart.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("no role selected")]
    Validation,

    #[error("request to {endpoint} failed")]
    Network {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
    },

    #[error("could not decode response from {endpoint}")]
    Parse {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl CrawlError {
    /// Short message safe to show in the UI. Details belong in the log.
    pub fn user_message(&self) -> &'static str {
        match self {
            CrawlError::Validation => "Please select a role first.",
            CrawlError::Network { .. } | CrawlError::Status { .. } | CrawlError::Parse { .. } => {
                "Failed to load trends."
            }
        }
    }
}

pub type CrawlResult<T> = Result<T, CrawlError>;
