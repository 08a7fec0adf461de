use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type DocId = u32;

/// Occurrence counts of one term, keyed by document.
pub type Postings = BTreeMap<DocId, u32>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMeta {
    pub url: String,
}

/// Term -> (DocId -> occurrence count). Counts are always >= 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InvertedIndex {
    terms: BTreeMap<String, Postings>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Set `index[term][doc_id] = count`. A zero count is ignored so no empty posting is ever stored.
    pub fn set_posting(&mut self, term: &str, doc_id: DocId, count: u32) {
        if count == 0 { return; }
        match self.terms.get_mut(term) {
            Some(postings) => { postings.insert(doc_id, count); }
            None => { self.terms.insert(term.to_string(), BTreeMap::from([(doc_id, count)])); }
        }
    }

    pub fn postings(&self, term: &str) -> Option<&Postings> { self.terms.get(term) }

    pub fn contains_term(&self, term: &str) -> bool { self.terms.contains_key(term) }

    pub fn num_terms(&self) -> usize { self.terms.len() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Postings)> + '_ {
        self.terms.iter().map(|(t, p)| (t.as_str(), p))
    }
}

/// DocId -> document metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DocumentStore {
    docs: BTreeMap<DocId, DocMeta>,
}

impl DocumentStore {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, doc_id: DocId, meta: DocMeta) { self.docs.insert(doc_id, meta); }

    pub fn get(&self, doc_id: DocId) -> Option<&DocMeta> { self.docs.get(&doc_id) }

    /// Highest assigned id, if any document is stored.
    pub fn max_doc_id(&self) -> Option<DocId> { self.docs.keys().next_back().copied() }

    pub fn len(&self) -> usize { self.docs.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (DocId, &DocMeta)> + '_ {
        self.docs.iter().map(|(id, m)| (*id, m))
    }
}
