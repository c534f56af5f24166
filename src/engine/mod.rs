mod client;

use crate::error::CrawlResult;
use crate::model::{Role, TrendsReport};
use std::future::Future;

pub use client::HttpTrendsApi;

pub(crate) const CRAWL_PATH: &str = "/api/crawl";
pub(crate) const TRENDS_PATH: &str = "/api/trends";

/// Backend operations the orchestrator depends on.
///
/// The HTTP client is the production implementation; tests substitute an in-memory fake so the
/// countdown can be driven tick by tick.
pub trait TrendsApi: Send + Sync {
    /// Ask the backend to start crawling for `role`. The response body is not consumed.
    fn start_crawl(&self, role: &Role) -> impl Future<Output = CrawlResult<()>> + Send;

    /// Fetch the aggregated report for `role` (empty role: all roles).
    fn fetch_trends(&self, role: &Role) -> impl Future<Output = CrawlResult<TrendsReport>> + Send;
}
