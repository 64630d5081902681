// file: src/models/article.rs
// description: PubMed article record as stored in the search index
// reference: https://pubmed.ncbi.nlm.nih.gov/

use serde::{Deserialize, Serialize};

pub const PUBMED_URL_BASE: &str = "https://pubmed.ncbi.nlm.nih.gov";

/// One index entry per PMID. Field order is the `_source` layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub pmid: String,
    pub url: String,
}

impl Article {
    pub fn new(pmid: String, title: Option<String>, abstract_text: Option<String>) -> Self {
        let url = Self::url_for(&pmid);
        Self {
            title,
            abstract_text,
            pmid,
            url,
        }
    }

    pub fn url_for(pmid: &str) -> String {
        format!("{}/{}/", PUBMED_URL_BASE, pmid)
    }

    /// Title and abstract joined for prompting, skipping whichever is missing.
    pub fn passage(&self) -> String {
        match (&self.title, &self.abstract_text) {
            (Some(title), Some(text)) => format!("{}\n{}", title, text),
            (Some(title), None) => title.clone(),
            (None, Some(text)) => text.clone(),
            (None, None) => String::new(),
        }
    }
}

/// Everything extracted from a single snapshot file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFile {
    pub articles: Vec<Article>,
    /// PMIDs listed under `DeleteCitation`, only present in update files.
    pub deleted_pmids: Vec<String>,
}

impl ParsedFile {
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty() && self.deleted_pmids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_article_url() {
        let article = Article::new("12345".to_string(), None, None);
        assert_eq!(article.url, "https://pubmed.ncbi.nlm.nih.gov/12345/");
    }

    #[test]
    fn test_article_source_layout() {
        let article = Article::new(
            "31".to_string(),
            Some("Title".to_string()),
            None,
        );
        let json = serde_json::to_string(&article).unwrap();
        assert_eq!(
            json,
            r#"{"title":"Title","abstract":null,"pmid":"31","url":"https://pubmed.ncbi.nlm.nih.gov/31/"}"#
        );
    }

    #[test]
    fn test_passage() {
        let full = Article::new("1".to_string(), Some("T".to_string()), Some("A".to_string()));
        assert_eq!(full.passage(), "T\nA");

        let empty = Article::new("2".to_string(), None, None);
        assert!(empty.passage().is_empty());
    }
}
