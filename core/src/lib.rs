pub mod index;
pub mod indexer;
pub mod persist;
pub mod search;
pub mod tokenizer;

pub use index::{DocId, DocMeta, DocumentStore, InvertedIndex, Postings};
pub use indexer::Indexer;
pub use search::{RetrievalEngine, SearchHit};
