use crate::persist::{load_documents, load_index, save_documents, save_index, IndexPaths};
use crate::tokenizer::tokenize;
use crate::{DocId, DocMeta, DocumentStore, InvertedIndex};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::Path;

/// Builds the inverted index and document store and writes them to an index directory.
///
/// Document ids are allocated from a counter owned by this instance. Mutation goes
/// through `&mut self`, so callers sharing one indexer across threads must wrap it in
/// a single lock that covers both `add_document` and `save`.
pub struct Indexer {
    paths: IndexPaths,
    index: InvertedIndex,
    documents: DocumentStore,
    next_doc_id: DocId,
}

impl Indexer {
    /// An empty indexer that will save into `root`. Nothing is read from disk.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            paths: IndexPaths::new(root),
            index: InvertedIndex::new(),
            documents: DocumentStore::new(),
            next_doc_id: 0,
        }
    }

    /// An indexer that continues from whatever is already persisted in `root`.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let mut indexer = Self::new(root);
        indexer.load()?;
        Ok(indexer)
    }

    /// Index `content` as a new document and return its id.
    ///
    /// Re-adding a URL creates another document; no deduplication happens here.
    /// Fails once the id space is exhausted, before anything is modified.
    pub fn add_document(&mut self, url: &str, content: &str) -> Result<DocId> {
        let doc_id = self.next_doc_id;
        self.next_doc_id = doc_id
            .checked_add(1)
            .ok_or_else(|| anyhow!("document id space exhausted at {doc_id}; cannot index {url}"))?;
        self.documents.insert(doc_id, DocMeta { url: url.to_string() });

        let mut term_freqs: HashMap<String, u32> = HashMap::new();
        for term in tokenize(content) {
            *term_freqs.entry(term).or_insert(0) += 1;
        }
        for (term, freq) in &term_freqs {
            self.index.set_posting(term, doc_id, *freq);
        }
        tracing::debug!(doc_id, url, distinct_terms = term_freqs.len(), "indexed document");
        Ok(doc_id)
    }

    /// Write the index and the document store as two separate artifacts.
    ///
    /// The index is written first; a failure on the second write leaves the two inconsistent.
    pub fn save(&self) -> Result<()> {
        tracing::info!(
            num_terms = self.index.num_terms(),
            num_docs = self.documents.len(),
            root = %self.paths.root.display(),
            "saving index"
        );
        save_index(&self.paths, &self.index)?;
        save_documents(&self.paths, &self.documents)?;
        Ok(())
    }

    /// Replace in-memory state with whatever is persisted. A missing artifact yields an empty structure.
    pub fn load(&mut self) -> Result<()> {
        let index = load_index(&self.paths)?.unwrap_or_default();
        let documents = load_documents(&self.paths)?.unwrap_or_default();
        let next_doc_id = match documents.max_doc_id() {
            Some(max) => max.checked_add(1).ok_or_else(|| {
                anyhow!("document id {max} in {} leaves no id to allocate", self.paths.metadata().display())
            })?,
            None => 0,
        };
        self.index = index;
        self.documents = documents;
        self.next_doc_id = next_doc_id;
        tracing::info!(
            num_terms = self.index.num_terms(),
            num_docs = self.documents.len(),
            next_doc_id = self.next_doc_id,
            "loaded existing index"
        );
        Ok(())
    }

    pub fn index(&self) -> &InvertedIndex { &self.index }

    pub fn documents(&self) -> &DocumentStore { &self.documents }

    pub fn next_doc_id(&self) -> DocId { self.next_doc_id }

    pub fn paths(&self) -> &IndexPaths { &self.paths }
}
