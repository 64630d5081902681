// file: src/parser/mod.rs
// description: PubMed XML parsing module exports
// reference: internal module structure

pub mod pubmed;

pub use pubmed::{Element, PubmedParser, Record, RecordReader};
