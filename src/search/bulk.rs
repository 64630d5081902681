// file: src/search/bulk.rs
// description: chunked _bulk indexing and deletion of PubMed articles
// reference: https://opensearch.org/docs/latest/api-reference/document-apis/bulk/

use crate::error::{PipelineError, Result};
use crate::models::Article;
use crate::search::client::OpenSearchClient;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct BulkResponse {
    errors: bool,
    #[serde(default)]
    items: Vec<HashMap<String, BulkItem>>,
}

#[derive(Debug, Deserialize)]
struct BulkItem {
    #[serde(rename = "_id")]
    id: Option<String>,
    status: u16,
    error: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkStats {
    pub items: usize,
    pub chunks: usize,
}

impl BulkStats {
    fn absorb(&mut self, items: usize) {
        self.items += items;
        self.chunks += 1;
    }
}

pub struct BulkIndexer<'a> {
    client: &'a OpenSearchClient,
    index: String,
    chunk_size: usize,
}

impl<'a> BulkIndexer<'a> {
    pub fn new(client: &'a OpenSearchClient, index: impl Into<String>, chunk_size: usize) -> Self {
        Self {
            client,
            index: index.into(),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Indexes articles under their PMID, one `_bulk` request per chunk.
    /// Stops at the first chunk with a failed item.
    pub async fn index_articles(&self, articles: &[Article]) -> Result<BulkStats> {
        let mut stats = BulkStats::default();

        for chunk in articles.chunks(self.chunk_size) {
            let payload = build_index_payload(&self.index, chunk)?;
            let response = self.client.bulk(payload).await?;
            stats.absorb(check_response(response)?);
        }

        debug!(
            "Indexed {} articles into {} in {} chunks",
            stats.items, self.index, stats.chunks
        );
        Ok(stats)
    }

    pub async fn delete_pmids(&self, pmids: &[String]) -> Result<BulkStats> {
        let mut stats = BulkStats::default();

        for chunk in pmids.chunks(self.chunk_size) {
            let payload = build_delete_payload(&self.index, chunk)?;
            let response = self.client.bulk(payload).await?;
            stats.absorb(check_response(response)?);
        }

        debug!("Deleted {} citations from {}", stats.items, self.index);
        Ok(stats)
    }
}

pub fn build_index_payload(index: &str, articles: &[Article]) -> Result<String> {
    let mut payload = String::new();

    for article in articles {
        let action = json!({"index": {"_index": index, "_id": article.pmid}});
        payload.push_str(&serde_json::to_string(&action)?);
        payload.push('\n');
        payload.push_str(&serde_json::to_string(article)?);
        payload.push('\n');
    }

    Ok(payload)
}

pub fn build_delete_payload(index: &str, pmids: &[String]) -> Result<String> {
    let mut payload = String::new();

    for pmid in pmids {
        let action = json!({"delete": {"_index": index, "_id": pmid}});
        payload.push_str(&serde_json::to_string(&action)?);
        payload.push('\n');
    }

    Ok(payload)
}

/// Returns the number of items in a successful response, or a `Bulk` error
/// when any item carries an error. Deletes of missing documents report
/// `not_found` without an error and pass.
fn check_response(response: Value) -> Result<usize> {
    let response: BulkResponse = serde_json::from_value(response)?;
    let total = response.items.len();

    if !response.errors {
        return Ok(total);
    }

    let failures: Vec<(&BulkItem, &Value)> = response
        .items
        .iter()
        .flat_map(|entry| entry.values())
        .filter_map(|item| item.error.as_ref().map(|error| (item, error)))
        .collect();

    if failures.is_empty() {
        return Ok(total);
    }

    let (item, error) = failures[0];
    let first_error = format!(
        "id {} (status {}): {}",
        item.id.as_deref().unwrap_or("?"),
        item.status,
        describe_error(error)
    );
    warn!("Bulk request rejected {} of {} items", failures.len(), total);

    Err(PipelineError::Bulk {
        failed: failures.len(),
        first_error,
    })
}

fn describe_error(error: &Value) -> String {
    match (error["type"].as_str(), error["reason"].as_str()) {
        (Some(kind), Some(reason)) => format!("{}: {}", kind, reason),
        _ => error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn article(pmid: &str) -> Article {
        Article::new(pmid.to_string(), Some(format!("Title {}", pmid)), None)
    }

    #[test]
    fn test_index_payload_is_ndjson() {
        let payload = build_index_payload("pubmed", &[article("1"), article("2")]).unwrap();
        let lines: Vec<&str> = payload.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(payload.ends_with('\n'));

        let action: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(action, json!({"index": {"_index": "pubmed", "_id": "1"}}));

        let source: Value = serde_json::from_str(lines[3]).unwrap();
        assert_eq!(source["pmid"], "2");
        assert_eq!(source["title"], "Title 2");
        assert_eq!(source["abstract"], Value::Null);
    }

    #[test]
    fn test_delete_payload() {
        let payload =
            build_delete_payload("pubmed_update", &["7".to_string(), "8".to_string()]).unwrap();
        let actions: Vec<Value> = payload
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(
            actions,
            vec![
                json!({"delete": {"_index": "pubmed_update", "_id": "7"}}),
                json!({"delete": {"_index": "pubmed_update", "_id": "8"}}),
            ]
        );
        assert!(payload.ends_with('\n'));
    }

    #[test]
    fn test_check_response_success() {
        let response = json!({
            "took": 5,
            "errors": false,
            "items": [
                {"index": {"_index": "pubmed", "_id": "1", "status": 201, "result": "created"}},
                {"index": {"_index": "pubmed", "_id": "2", "status": 200, "result": "updated"}}
            ]
        });
        assert_eq!(check_response(response).unwrap(), 2);
    }

    #[test]
    fn test_check_response_item_failure() {
        let response = json!({
            "took": 5,
            "errors": true,
            "items": [
                {"index": {"_index": "pubmed", "_id": "1", "status": 201, "result": "created"}},
                {"index": {"_index": "pubmed", "_id": "2", "status": 400,
                    "error": {"type": "mapper_parsing_exception", "reason": "failed to parse"}}}
            ]
        });

        match check_response(response).unwrap_err() {
            PipelineError::Bulk { failed, first_error } => {
                assert_eq!(failed, 1);
                assert_eq!(
                    first_error,
                    "id 2 (status 400): mapper_parsing_exception: failed to parse"
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_check_response_delete_not_found_passes() {
        let response = json!({
            "took": 1,
            "errors": true,
            "items": [
                {"delete": {"_index": "pubmed", "_id": "9", "status": 404, "result": "not_found"}}
            ]
        });
        assert_eq!(check_response(response).unwrap(), 1);
    }

    #[test]
    fn test_bulk_stats_absorb() {
        let mut stats = BulkStats::default();
        stats.absorb(50);
        stats.absorb(3);
        assert_eq!(stats, BulkStats { items: 53, chunks: 2 });
    }
}
