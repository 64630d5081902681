// file: src/models/search_result.rs
// description: Search hit model parsed from the cluster's _search response
// reference: https://opensearch.org/docs/latest/api-reference/search/

use crate::models::Article;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Relevance score assigned by the cluster (BM25 by default)
    pub score: f64,

    pub article: Article,
}

impl SearchHit {
    pub fn new(score: f64, article: Article) -> Self {
        Self { score, article }
    }

    pub fn pmid(&self) -> &str {
        &self.article.pmid
    }

    pub fn preview(&self, max_chars: usize) -> String {
        let text = self.article.abstract_text.as_deref().unwrap_or("");
        if text.chars().count() <= max_chars {
            text.to_string()
        } else {
            let truncated: String = text.chars().take(max_chars).collect();
            format!("{}...", truncated)
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HitsEnvelope {
    pub hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawHit {
    #[serde(rename = "_score")]
    pub score: Option<f64>,
    #[serde(rename = "_source")]
    pub source: Article,
}

impl From<RawHit> for SearchHit {
    fn from(raw: RawHit) -> Self {
        SearchHit::new(raw.score.unwrap_or(0.0), raw.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let body = r#"{
            "took": 3,
            "hits": {
                "total": {"value": 1, "relation": "eq"},
                "hits": [{
                    "_index": "pubmed",
                    "_id": "42",
                    "_score": 7.5,
                    "_source": {
                        "title": "Aspirin and stroke",
                        "abstract": "Low dose aspirin reduces risk.",
                        "pmid": "42",
                        "url": "https://pubmed.ncbi.nlm.nih.gov/42/"
                    }
                }]
            }
        }"#;

        let response: SearchResponse = serde_json::from_str(body).unwrap();
        let hits: Vec<SearchHit> = response.hits.hits.into_iter().map(SearchHit::from).collect();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].pmid(), "42");
        assert_eq!(hits[0].score, 7.5);
        assert_eq!(hits[0].article.title.as_deref(), Some("Aspirin and stroke"));
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let article = Article::new("1".to_string(), None, Some("αβγδε".to_string()));
        let hit = SearchHit::new(1.0, article);
        assert_eq!(hit.preview(3), "αβγ...");
        assert_eq!(hit.preview(10), "αβγδε");
    }
}
