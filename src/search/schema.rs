// file: src/search/schema.rs
// description: index settings and field mappings for PubMed articles
// reference: https://opensearch.org/docs/latest/api-reference/index-apis/create-index/

use crate::config::IndexConfig;
use crate::error::Result;
use crate::search::client::OpenSearchClient;
use serde_json::{Value, json};
use tracing::{info, warn};

pub struct SchemaManager<'a> {
    client: &'a OpenSearchClient,
    config: &'a IndexConfig,
}

impl<'a> SchemaManager<'a> {
    pub fn new(client: &'a OpenSearchClient, config: &'a IndexConfig) -> Self {
        Self { client, config }
    }

    /// Creates the index unless it already exists. Returns whether it was
    /// created.
    pub async fn initialize(&self) -> Result<bool> {
        let index = &self.config.name;

        if self.client.index_exists(index).await? {
            info!("Index '{}' already exists", index);
            return Ok(false);
        }

        info!("Creating index '{}'", index);
        let response = self
            .client
            .create_index(index, &Self::index_body(self.config.shards, self.config.replicas))
            .await?;
        info!("Index created: {}", response);
        Ok(true)
    }

    pub async fn verify_schema(&self) -> Result<bool> {
        let index = &self.config.name;

        if !self.client.index_exists(index).await? {
            warn!("Index '{}' does not exist", index);
            return Ok(false);
        }

        info!("Index '{}' exists", index);
        Ok(true)
    }

    pub async fn drop_index(&self) -> Result<()> {
        let index = &self.config.name;

        if self.client.index_exists(index).await? {
            warn!("Dropping index '{}'", index);
            self.client.delete_index(index).await?;
            info!("Dropped index: {}", index);
        }

        Ok(())
    }

    /// Create-index body: english analysis on the text fields, exact match on
    /// identifiers.
    pub fn index_body(shards: u32, replicas: u32) -> Value {
        json!({
            "settings": {
                "number_of_shards": shards,
                "number_of_replicas": replicas
            },
            "mappings": {
                "properties": {
                    "title": {"type": "text", "analyzer": "english"},
                    "abstract": {"type": "text", "analyzer": "english"},
                    "pmid": {"type": "keyword"},
                    "url": {"type": "keyword"}
                }
            }
        })
    }
}
