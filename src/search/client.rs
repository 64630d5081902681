// file: src/search/client.rs
// description: OpenSearch REST client wrapper with connection management
// reference: https://opensearch.org/docs/latest/api-reference/

use crate::config::OpenSearchConfig;
use crate::error::{PipelineError, Result};
use crate::models::SearchHit;
use crate::models::search_result::SearchResponse;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Clone)]
pub struct OpenSearchClient {
    client: Client,
    base_url: String,
    config: OpenSearchConfig,
}

impl OpenSearchClient {
    pub fn new(config: OpenSearchConfig) -> Result<Self> {
        let base_url = Self::base_url_for(&config);
        info!("Connecting to OpenSearch at {}", base_url);

        let client = Client::builder()
            .danger_accept_invalid_certs(!config.verify_certs)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    pub fn base_url_for(config: &OpenSearchConfig) -> String {
        let scheme = if config.use_ssl { "https" } else { "http" };
        format!("{}://{}:{}", scheme, config.host, config.port)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let builder = self.client.request(method, url);

        if self.config.username.is_empty() {
            builder
        } else {
            builder.basic_auth(&self.config.username, Some(&self.config.password))
        }
    }

    async fn check(response: Response, action: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(PipelineError::Search(format!(
            "{} failed with status {}: {}",
            action, status, body
        )))
    }

    pub async fn ping(&self) -> Result<bool> {
        debug!("Checking OpenSearch connection");

        let response = self.request(Method::GET, "/").send().await?;
        let response = Self::check(response, "Ping").await?;
        let info: Value = response.json().await?;

        info!(
            "OpenSearch connection successful (version {})",
            info["version"]["number"].as_str().unwrap_or("unknown")
        );
        Ok(true)
    }

    pub async fn index_exists(&self, index: &str) -> Result<bool> {
        let response = self.request(Method::HEAD, index).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(PipelineError::Search(format!(
                "Index existence check for {} returned status {}",
                index, status
            ))),
        }
    }

    pub async fn create_index(&self, index: &str, body: &Value) -> Result<Value> {
        let response = self.request(Method::PUT, index).json(body).send().await?;
        let response = Self::check(response, &format!("Creating index {}", index)).await?;
        Ok(response.json().await?)
    }

    pub async fn delete_index(&self, index: &str) -> Result<()> {
        let response = self.request(Method::DELETE, index).send().await?;
        Self::check(response, &format!("Deleting index {}", index)).await?;
        Ok(())
    }

    pub async fn refresh(&self, index: &str) -> Result<()> {
        let response = self
            .request(Method::POST, &format!("{}/_refresh", index))
            .send()
            .await?;
        Self::check(response, &format!("Refreshing index {}", index)).await?;
        Ok(())
    }

    pub async fn count(&self, index: &str) -> Result<u64> {
        let response = self
            .request(Method::GET, &format!("{}/_count", index))
            .send()
            .await?;
        let response = Self::check(response, &format!("Counting {}", index)).await?;
        let count: CountResponse = response.json().await?;
        Ok(count.count)
    }

    /// Posts an NDJSON body to `_bulk` and returns the raw response.
    pub async fn bulk(&self, payload: String) -> Result<Value> {
        let response = self
            .request(Method::POST, "_bulk")
            .header("Content-Type", "application/x-ndjson")
            .body(payload)
            .send()
            .await?;
        let response = Self::check(response, "Bulk request").await?;
        Ok(response.json().await?)
    }

    pub async fn search(&self, index: &str, query: &str, size: usize) -> Result<Vec<SearchHit>> {
        let body = Self::search_body(query, size);
        debug!("Searching {} for '{}'", index, query);

        let response = self
            .request(Method::POST, &format!("{}/_search", index))
            .json(&body)
            .send()
            .await?;
        let response = Self::check(response, &format!("Searching {}", index)).await?;
        let parsed: SearchResponse = response.json().await?;

        let hits: Vec<SearchHit> = parsed.hits.hits.into_iter().map(SearchHit::from).collect();
        debug!("Search returned {} hits", hits.len());
        Ok(hits)
    }

    pub fn search_body(query: &str, size: usize) -> Value {
        json!({
            "size": size,
            "query": {
                "multi_match": {
                    "query": query,
                    "fields": ["title", "abstract"]
                }
            }
        })
    }
}
