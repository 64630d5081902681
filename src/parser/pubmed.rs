// file: src/parser/pubmed.rs
// description: streaming parser for PubMed baseline/update XML (optionally gzipped)
// reference: https://docs.rs/quick-xml, https://dtd.nlm.nih.gov/ncbi/pubmed/

use crate::error::{PipelineError, Result};
use crate::models::{Article, ParsedFile};
use flate2::read::GzDecoder;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, BytesText, Event};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

const ROOT_TAG: &str = "PubmedArticleSet";

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Element(Element),
    Text(String),
}

/// Minimal element tree for one top-level record. Lookups follow
/// ElementTree semantics: `child` checks direct children, `find` and
/// `find_all` walk descendants in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    content: Vec<Node>,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            content: Vec::new(),
        }
    }

    fn push_text(&mut self, text: String) {
        if !text.is_empty() {
            self.content.push(Node::Text(text));
        }
    }

    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.content.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children().find(|c| c.name == name)
    }

    pub fn find(&self, name: &str) -> Option<&Element> {
        for child in self.children() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect(name, &mut found);
        found
    }

    fn collect<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in self.children() {
            if child.name == name {
                found.push(child);
            }
            child.collect(name, found);
        }
    }

    /// Full text content, inline markup included.
    pub fn text(&self) -> String {
        let mut buf = String::new();
        self.append_text(&mut buf);
        buf
    }

    fn append_text(&self, buf: &mut String) {
        for node in &self.content {
            match node {
                Node::Text(text) => buf.push_str(text),
                Node::Element(element) => element.append_text(buf),
            }
        }
    }

    pub fn non_empty_text(&self) -> Option<String> {
        let text = self.text();
        if text.trim().is_empty() { None } else { Some(text) }
    }
}

/// A top-level child of `PubmedArticleSet` after conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Article(Article),
    Deleted(Vec<String>),
}

/// Iterates over the records of a `PubmedArticleSet` document without
/// loading the whole document into memory.
pub struct RecordReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    started: bool,
    finished: bool,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: Reader::from_reader(source),
            buf: Vec::new(),
            started: false,
            finished: false,
        }
    }

    /// Consumes the prolog up to the root element. Returns `false` when the
    /// root is self-closing and there is nothing to read.
    fn read_root(&mut self) -> Result<bool> {
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(start) => {
                    check_root(&start)?;
                    return Ok(true);
                }
                Event::Empty(start) => {
                    check_root(&start)?;
                    return Ok(false);
                }
                Event::Eof => {
                    return Err(PipelineError::Xml("document has no root element".to_string()));
                }
                _ => {}
            }
        }
    }

    fn read_record(&mut self) -> Result<Option<Record>> {
        if !self.started {
            self.started = true;
            if !self.read_root()? {
                return Ok(None);
            }
        }

        let mut stack: Vec<Element> = Vec::new();

        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(start) => {
                    stack.push(Element::new(element_name(&start)?));
                }
                Event::Empty(start) => {
                    let element = Element::new(element_name(&start)?);
                    if let Some(done) = attach(&mut stack, element) {
                        return convert(done).map(Some);
                    }
                }
                Event::End(_) => match stack.pop() {
                    Some(element) => {
                        if let Some(done) = attach(&mut stack, element) {
                            return convert(done).map(Some);
                        }
                    }
                    // closing tag of the root
                    None => return Ok(None),
                },
                Event::Text(text) => {
                    if let Some(top) = stack.last_mut() {
                        top.push_text(text_content(&text));
                    }
                }
                Event::CData(data) => {
                    if let Some(top) = stack.last_mut() {
                        top.push_text(String::from_utf8_lossy(&data).into_owned());
                    }
                }
                Event::Eof => {
                    return Err(PipelineError::Xml(format!(
                        "unexpected end of document inside {}",
                        ROOT_TAG
                    )));
                }
                _ => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

pub struct PubmedParser;

impl PubmedParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_reader<R: BufRead>(&self, source: R) -> Result<ParsedFile> {
        let mut parsed = ParsedFile::default();

        for record in RecordReader::new(source) {
            match record? {
                Record::Article(article) => parsed.articles.push(article),
                Record::Deleted(pmids) => parsed.deleted_pmids.extend(pmids),
            }
        }

        Ok(parsed)
    }

    pub fn parse_str(&self, xml: &str) -> Result<ParsedFile> {
        self.parse_reader(xml.as_bytes())
    }

    /// Reads a snapshot file, gunzipping it when the name ends in `.gz`.
    pub fn read_file(&self, path: &Path) -> Result<ParsedFile> {
        let file = File::open(path).map_err(|source| PipelineError::FileOperation {
            path: path.to_path_buf(),
            source,
        })?;

        let gzipped = path
            .file_name()
            .map(|name| name.to_string_lossy().ends_with(".gz"))
            .unwrap_or(false);

        debug!("Parsing {} (gzip: {})", path.display(), gzipped);

        let result = if gzipped {
            self.parse_reader(BufReader::new(GzDecoder::new(file)))
        } else {
            self.parse_reader(BufReader::new(file))
        };

        result.map_err(|e| match e {
            PipelineError::Xml(message) => {
                PipelineError::Xml(format!("{}: {}", path.display(), message))
            }
            other => other,
        })
    }
}

impl Default for PubmedParser {
    fn default() -> Self {
        Self::new()
    }
}

fn element_name(start: &BytesStart) -> Result<String> {
    std::str::from_utf8(start.name().as_ref())
        .map(str::to_string)
        .map_err(|e| PipelineError::Xml(format!("invalid element name: {}", e)))
}

fn check_root(start: &BytesStart) -> Result<()> {
    let name = element_name(start)?;
    if name != ROOT_TAG {
        return Err(PipelineError::UnexpectedRoot(name));
    }
    Ok(())
}

fn text_content(text: &BytesText) -> String {
    match text.unescape() {
        Ok(unescaped) => unescaped.into_owned(),
        Err(e) => {
            debug!("Keeping raw text after unescape failure: {}", e);
            String::from_utf8_lossy(text).into_owned()
        }
    }
}

/// Appends `element` to its parent, or hands it back when it was a
/// top-level record.
fn attach(stack: &mut [Element], element: Element) -> Option<Element> {
    match stack.last_mut() {
        Some(parent) => {
            parent.content.push(Node::Element(element));
            None
        }
        None => Some(element),
    }
}

fn convert(element: Element) -> Result<Record> {
    match element.name.as_str() {
        "PubmedArticle" => {
            let pmid = pmid_of(&element)?;
            let title = element.find("ArticleTitle").and_then(Element::non_empty_text);
            let abstract_text = element.find("Abstract").and_then(abstract_of);
            Ok(Record::Article(Article::new(pmid, title, abstract_text)))
        }
        "PubmedBookArticle" => {
            let pmid = pmid_of(&element)?;
            let book_document = element.child("BookDocument");

            let title = book_document.and_then(|doc| {
                doc.child("ArticleTitle")
                    .and_then(Element::non_empty_text)
                    .or_else(|| doc.child("VernacularTitle").and_then(Element::non_empty_text))
                    .or_else(|| {
                        doc.child("Book")
                            .and_then(|book| book.child("BookTitle"))
                            .and_then(Element::non_empty_text)
                    })
            });
            let abstract_text = book_document
                .and_then(|doc| doc.child("Abstract"))
                .and_then(abstract_of);

            Ok(Record::Article(Article::new(pmid, title, abstract_text)))
        }
        "DeleteCitation" => {
            let pmids = element
                .find_all("PMID")
                .into_iter()
                .filter_map(Element::non_empty_text)
                .map(|pmid| pmid.trim().to_string())
                .collect();
            Ok(Record::Deleted(pmids))
        }
        other => Err(PipelineError::UnexpectedRecord(other.to_string())),
    }
}

fn pmid_of(element: &Element) -> Result<String> {
    element
        .find("PMID")
        .and_then(Element::non_empty_text)
        .map(|pmid| pmid.trim().to_string())
        .ok_or_else(|| PipelineError::MissingPmid {
            tag: element.name.clone(),
        })
}

fn abstract_of(abstract_element: &Element) -> Option<String> {
    let sections: Vec<String> = abstract_element
        .find_all("AbstractText")
        .into_iter()
        .filter_map(Element::non_empty_text)
        .collect();

    if sections.is_empty() {
        None
    } else {
        Some(sections.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE PubmedArticleSet PUBLIC "-//NLM//DTD PubMedArticle, 1st January 2024//EN" "https://dtd.nlm.nih.gov/ncbi/pubmed/out/pubmed_240101.dtd">
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation Status="MEDLINE" Owner="NLM">
      <PMID Version="1">100</PMID>
      <Article PubModel="Print">
        <ArticleTitle>Effects of <i>Escherichia coli</i> on mice &amp; rats.</ArticleTitle>
        <Abstract>
          <AbstractText Label="BACKGROUND">Background text.</AbstractText>
          <AbstractText Label="EMPTY"></AbstractText>
          <AbstractText Label="RESULTS">Results with p &lt; 0.05.</AbstractText>
        </Abstract>
      </Article>
      <OtherAbstract Type="Publisher">
        <AbstractText>Not part of the main abstract.</AbstractText>
      </OtherAbstract>
      <CommentsCorrectionsList>
        <CommentsCorrections RefType="CommentIn">
          <PMID Version="1">999</PMID>
        </CommentsCorrections>
      </CommentsCorrectionsList>
    </MedlineCitation>
  </PubmedArticle>
  <PubmedBookArticle>
    <BookDocument>
      <PMID Version="1">200</PMID>
      <Book>
        <BookTitle>Handbook of Genes</BookTitle>
      </Book>
      <VernacularTitle>Manuel des genes</VernacularTitle>
      <Abstract>
        <AbstractText>Book abstract.</AbstractText>
      </Abstract>
    </BookDocument>
  </PubmedBookArticle>
  <DeleteCitation>
    <PMID Version="1">300</PMID>
    <PMID Version="1">301</PMID>
  </DeleteCitation>
</PubmedArticleSet>
"#;

    #[test]
    fn test_parse_article() {
        let parsed = PubmedParser::new().parse_str(SAMPLE).unwrap();
        assert_eq!(parsed.articles.len(), 2);

        let article = &parsed.articles[0];
        assert_eq!(article.pmid, "100");
        assert_eq!(
            article.title.as_deref(),
            Some("Effects of Escherichia coli on mice & rats.")
        );
        assert_eq!(
            article.abstract_text.as_deref(),
            Some("Background text. Results with p < 0.05.")
        );
        assert_eq!(article.url, "https://pubmed.ncbi.nlm.nih.gov/100/");
    }

    #[test]
    fn test_parse_book_article_title_fallback() {
        let parsed = PubmedParser::new().parse_str(SAMPLE).unwrap();
        let book = &parsed.articles[1];
        assert_eq!(book.pmid, "200");
        assert_eq!(book.title.as_deref(), Some("Manuel des genes"));
        assert_eq!(book.abstract_text.as_deref(), Some("Book abstract."));
    }

    #[test]
    fn test_book_title_from_book_element() {
        let xml = r#"<PubmedArticleSet>
  <PubmedBookArticle>
    <BookDocument>
      <PMID>201</PMID>
      <Book><BookTitle>Only the book title</BookTitle></Book>
    </BookDocument>
  </PubmedBookArticle>
</PubmedArticleSet>"#;
        let parsed = PubmedParser::new().parse_str(xml).unwrap();
        assert_eq!(parsed.articles[0].title.as_deref(), Some("Only the book title"));
        assert_eq!(parsed.articles[0].abstract_text, None);
    }

    #[test]
    fn test_delete_citations_collected() {
        let parsed = PubmedParser::new().parse_str(SAMPLE).unwrap();
        assert_eq!(parsed.deleted_pmids, vec!["300".to_string(), "301".to_string()]);
    }

    #[test]
    fn test_article_without_title_or_abstract() {
        let xml = "<PubmedArticleSet><PubmedArticle><MedlineCitation><PMID>5</PMID><Article><ArticleTitle/></Article></MedlineCitation></PubmedArticle></PubmedArticleSet>";
        let parsed = PubmedParser::new().parse_str(xml).unwrap();
        assert_eq!(parsed.articles, vec![Article::new("5".to_string(), None, None)]);
    }

    #[test]
    fn test_wrong_root_rejected() {
        let err = PubmedParser::new()
            .parse_str("<MedlineCitationSet></MedlineCitationSet>")
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnexpectedRoot(ref name) if name == "MedlineCitationSet"));
    }

    #[test]
    fn test_missing_pmid_rejected() {
        let xml = "<PubmedArticleSet><PubmedArticle><MedlineCitation><Article><ArticleTitle>x</ArticleTitle></Article></MedlineCitation></PubmedArticle></PubmedArticleSet>";
        let err = PubmedParser::new().parse_str(xml).unwrap_err();
        assert!(matches!(err, PipelineError::MissingPmid { ref tag } if tag == "PubmedArticle"));
    }

    #[test]
    fn test_unknown_record_rejected() {
        let xml = "<PubmedArticleSet><Something/></PubmedArticleSet>";
        let err = PubmedParser::new().parse_str(xml).unwrap_err();
        assert!(matches!(err, PipelineError::UnexpectedRecord(ref tag) if tag == "Something"));
    }

    #[test]
    fn test_empty_sets() {
        let parser = PubmedParser::new();
        assert!(parser.parse_str("<PubmedArticleSet/>").unwrap().is_empty());
        assert!(parser.parse_str("<PubmedArticleSet>\n</PubmedArticleSet>").unwrap().is_empty());
    }

    #[test]
    fn test_truncated_document_is_error() {
        let xml = "<PubmedArticleSet><PubmedArticle><MedlineCitation><PMID>1</PMID>";
        assert!(PubmedParser::new().parse_str(xml).is_err());
    }

    #[test]
    fn test_record_reader_stops_after_error() {
        let xml = "<PubmedArticleSet><Bogus/><PubmedArticle><PMID>1</PMID></PubmedArticle></PubmedArticleSet>";
        let mut records = RecordReader::new(xml.as_bytes());
        assert!(records.next().unwrap().is_err());
        assert!(records.next().is_none());
    }

    #[test]
    fn test_element_lookup_semantics() {
        let xml = "<PubmedArticleSet><PubmedArticle><A><PMID>1</PMID></A><PMID>2</PMID></PubmedArticle></PubmedArticleSet>";
        let parsed = PubmedParser::new().parse_str(xml).unwrap();
        // first descendant in document order wins
        assert_eq!(parsed.articles[0].pmid, "1");
    }

    #[test]
    fn test_read_gzip_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pubmed24n0001.xml.gz");

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(SAMPLE.as_bytes()).unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        let parsed = PubmedParser::new().read_file(&path).unwrap();
        assert_eq!(parsed.articles.len(), 2);
        assert_eq!(parsed.deleted_pmids.len(), 2);
    }

    #[test]
    fn test_read_plain_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sample.xml");
        std::fs::write(&path, SAMPLE).unwrap();

        let parsed = PubmedParser::new().read_file(&path).unwrap();
        assert_eq!(parsed.articles[0].pmid, "100");
    }

    #[test]
    fn test_read_missing_file() {
        let err = PubmedParser::new()
            .read_file(Path::new("/nonexistent/pubmed.xml.gz"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::FileOperation { .. }));
    }

    #[test]
    fn test_corrupt_gzip_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.xml.gz");
        std::fs::write(&path, b"definitely not gzip").unwrap();

        assert!(PubmedParser::new().read_file(&path).is_err());
    }
}
