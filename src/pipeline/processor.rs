// file: src/pipeline/processor.rs
// description: turns one snapshot file into bulk index (and delete) requests
// reference: parses PubMed XML off the async runtime, then submits in chunks

use crate::config::Config;
use crate::error::Result;
use crate::models::ParsedFile;
use crate::parser::PubmedParser;
use crate::search::{BulkIndexer, OpenSearchClient};
use crate::source::SnapshotFile;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileOutcome {
    pub articles_indexed: usize,
    pub deletions_applied: usize,
    /// `DeleteCitation` PMIDs seen but left alone because deletions are off.
    pub deletions_skipped: usize,
}

pub struct FileProcessor {
    client: OpenSearchClient,
    index: String,
    chunk_size: usize,
    apply_deletions: bool,
}

impl FileProcessor {
    pub fn new(client: OpenSearchClient, config: &Config) -> Self {
        Self {
            client,
            index: config.index.name.clone(),
            chunk_size: config.pipeline.bulk_chunk_size,
            apply_deletions: config.pipeline.apply_deletions,
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index
    }

    /// Decompresses and parses on the blocking pool.
    pub async fn parse(&self, file: &SnapshotFile) -> Result<ParsedFile> {
        let path = file.path.clone();

        let parsed =
            tokio::task::spawn_blocking(move || PubmedParser::new().read_file(&path)).await??;

        debug!(
            "Parsed {}: {} articles, {} delete citations",
            file.file_name,
            parsed.articles.len(),
            parsed.deleted_pmids.len()
        );
        Ok(parsed)
    }

    pub async fn index(&self, parsed: &ParsedFile) -> Result<FileOutcome> {
        let indexer = BulkIndexer::new(&self.client, self.index.clone(), self.chunk_size);
        let mut outcome = FileOutcome::default();

        if !parsed.articles.is_empty() {
            outcome.articles_indexed = indexer.index_articles(&parsed.articles).await?.items;
        }

        if !parsed.deleted_pmids.is_empty() {
            if self.apply_deletions {
                outcome.deletions_applied = indexer.delete_pmids(&parsed.deleted_pmids).await?.items;
            } else {
                debug!(
                    "Skipping {} delete citations (deletions disabled)",
                    parsed.deleted_pmids.len()
                );
                outcome.deletions_skipped = parsed.deleted_pmids.len();
            }
        }

        Ok(outcome)
    }

    pub async fn process(&self, file: &SnapshotFile) -> Result<FileOutcome> {
        info!("Processing file: {}", file.file_name);
        let parsed = self.parse(file).await?;
        self.index(&parsed).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Article;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn processor(apply_deletions: bool) -> FileProcessor {
        let mut config = Config::default_config();
        config.index.name = "pubmed_update".to_string();
        config.pipeline.apply_deletions = apply_deletions;
        let client = OpenSearchClient::new(config.opensearch.clone()).unwrap();
        FileProcessor::new(client, &config)
    }

    #[tokio::test]
    async fn test_parse_plain_snapshot() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pubmed24n1300.xml");
        std::fs::write(
            &path,
            "<PubmedArticleSet><PubmedArticle><PMID>11</PMID></PubmedArticle><DeleteCitation><PMID>12</PMID></DeleteCitation></PubmedArticleSet>",
        )
        .unwrap();

        let file = SnapshotFile {
            path,
            file_name: "pubmed24n1300.xml".to_string(),
            size: 0,
        };

        let parsed = processor(false).parse(&file).await.unwrap();
        assert_eq!(parsed.articles, vec![Article::new("11".to_string(), None, None)]);
        assert_eq!(parsed.deleted_pmids, vec!["12".to_string()]);
    }

    #[tokio::test]
    async fn test_parse_missing_file_fails() {
        let file = SnapshotFile {
            path: PathBuf::from("/nonexistent/pubmed24n0001.xml.gz"),
            file_name: "pubmed24n0001.xml.gz".to_string(),
            size: 0,
        };
        assert!(processor(false).parse(&file).await.is_err());
    }

    #[tokio::test]
    async fn test_deletions_skipped_without_requests() {
        let parsed = ParsedFile {
            articles: vec![],
            deleted_pmids: vec!["1".to_string(), "2".to_string()],
        };

        // no articles and deletions disabled: nothing is sent to the cluster
        let outcome = processor(false).index(&parsed).await.unwrap();
        assert_eq!(
            outcome,
            FileOutcome {
                articles_indexed: 0,
                deletions_applied: 0,
                deletions_skipped: 2,
            }
        );
    }

    #[test]
    fn test_index_name_from_config() {
        assert_eq!(processor(true).index_name(), "pubmed_update");
    }
}
