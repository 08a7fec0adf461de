use crate::persist::{load_documents, load_index, IndexPaths};
use crate::tokenizer::tokenize;
use crate::{DocId, DocMeta, DocumentStore, InvertedIndex};
use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub url: String,
    pub score: u64,
}

/// Read-only view of a persisted index that answers keyword queries.
///
/// Holds its own copy of the index taken at `load_index` time; later saves by an
/// `Indexer` are not visible until the next load.
pub struct RetrievalEngine {
    paths: IndexPaths,
    index: InvertedIndex,
    documents: DocumentStore,
}

impl RetrievalEngine {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { paths: IndexPaths::new(root), index: InvertedIndex::new(), documents: DocumentStore::new() }
    }

    /// Load both artifacts. Returns `Ok(false)` when either is missing; only storage faults are errors.
    pub fn load_index(&mut self) -> Result<bool> {
        if !self.paths.exists() {
            tracing::warn!(root = %self.paths.root.display(), "index not found");
            return Ok(false);
        }
        let (Some(index), Some(documents)) = (load_index(&self.paths)?, load_documents(&self.paths)?) else {
            // removed between the existence check and the read
            return Ok(false);
        };
        self.index = index;
        self.documents = documents;
        tracing::info!(num_docs = self.documents.len(), num_terms = self.index.num_terms(), "loaded index");
        Ok(true)
    }

    /// Score every document containing at least one query term.
    ///
    /// `score(doc) = sum over query terms t of index[t][doc]`, repeated query terms counted
    /// each time. Sorted by score descending, then doc id ascending.
    pub fn rank(&self, query: &str) -> Vec<(DocId, u64)> {
        let terms = tokenize(query);
        if terms.is_empty() {
            return Vec::new();
        }
        let mut scores: HashMap<DocId, u64> = HashMap::new();
        for term in &terms {
            let Some(postings) = self.index.postings(term) else { continue };
            for (doc_id, freq) in postings {
                *scores.entry(*doc_id).or_insert(0) += u64::from(*freq);
            }
        }
        let mut ranked: Vec<(DocId, u64)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
    }

    /// Ranked `{url, score}` hits for `query`. Postings pointing at unknown documents are skipped.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let mut hits = Vec::new();
        for (doc_id, score) in self.rank(query) {
            match self.documents.get(doc_id) {
                Some(meta) => hits.push(SearchHit { doc_id, url: meta.url.clone(), score }),
                None => tracing::warn!(doc_id, score, "posting references a document missing from the document store; skipped"),
            }
        }
        hits
    }

    pub fn document(&self, doc_id: DocId) -> Option<&DocMeta> { self.documents.get(doc_id) }

    pub fn num_documents(&self) -> usize { self.documents.len() }

    pub fn num_terms(&self) -> usize { self.index.num_terms() }

    pub fn paths(&self) -> &IndexPaths { &self.paths }
}
