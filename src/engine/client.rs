use super::{TrendsApi, CRAWL_PATH, TRENDS_PATH};
use crate::error::{CrawlError, CrawlResult};
use crate::model::{Role, RunConfig, TrendsReport};
use anyhow::{Context, Result};
use reqwest::{Client, Response};
use tracing::{debug, warn};

pub struct HttpTrendsApi {
    http: Client,
    base_url: String,
}

impl HttpTrendsApi {
    pub fn new(cfg: &RunConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.request_timeout)
            .build()
            .context("build HTTP client")?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str, role: &Role) -> String {
        format!("{}{}?role={}", self.base_url, path, role.query_value())
    }

    async fn get(&self, endpoint: &'static str, role: &Role) -> CrawlResult<Response> {
        let url = self.url(endpoint, role);
        debug!(%url, "GET");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| CrawlError::Network { endpoint, source })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CrawlError::Status { endpoint, status });
        }
        Ok(resp)
    }
}

impl TrendsApi for HttpTrendsApi {
    async fn start_crawl(&self, role: &Role) -> CrawlResult<()> {
        let resp = self.get(CRAWL_PATH, role).await?;
        // Body carries only an acknowledgement; dropping it releases the connection.
        drop(resp);
        Ok(())
    }

    async fn fetch_trends(&self, role: &Role) -> CrawlResult<TrendsReport> {
        let resp = self.get(TRENDS_PATH, role).await?;
        let body = resp.bytes().await.map_err(|source| CrawlError::Network {
            endpoint: TRENDS_PATH,
            source,
        })?;
        serde_json::from_slice(&body).map_err(|source| {
            warn!(bytes = body.len(), "trends response is not a valid report");
            CrawlError::Parse {
                endpoint: TRENDS_PATH,
                source,
            }
        })
    }
}
