use crate::{DocId, DocMeta, DocumentStore, InvertedIndex};
use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// On-disk shape of `index_data.json`: term -> (doc id as string -> count).
type RawIndex = BTreeMap<String, BTreeMap<String, u32>>;
/// On-disk shape of `metadata.json`: doc id as string -> metadata.
type RawDocs = BTreeMap<String, DocMeta>;

#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn index_data(&self) -> PathBuf { self.root.join("index_data.json") }
    pub fn metadata(&self) -> PathBuf { self.root.join("metadata.json") }

    /// True when both artifacts are present.
    pub fn exists(&self) -> bool { self.index_data().is_file() && self.metadata().is_file() }
}

pub fn save_index(paths: &IndexPaths, index: &InvertedIndex) -> Result<()> {
    write_json(&paths.index_data(), index)
}

/// Load the inverted index, or `None` if the artifact does not exist.
pub fn load_index(paths: &IndexPaths) -> Result<Option<InvertedIndex>> {
    let path = paths.index_data();
    let Some(raw) = read_json::<RawIndex>(&path)? else { return Ok(None) };
    let mut index = InvertedIndex::new();
    for (term, postings) in raw {
        for (key, count) in postings {
            let doc_id = parse_doc_id(&key).with_context(|| format!("term {term:?} in {}", path.display()))?;
            if count == 0 {
                bail!("zero occurrence count for term {term:?}, document {doc_id} in {}", path.display());
            }
            index.set_posting(&term, doc_id, count);
        }
    }
    Ok(Some(index))
}

pub fn save_documents(paths: &IndexPaths, docs: &DocumentStore) -> Result<()> {
    write_json(&paths.metadata(), docs)
}

/// Load the document store, or `None` if the artifact does not exist.
pub fn load_documents(paths: &IndexPaths) -> Result<Option<DocumentStore>> {
    let path = paths.metadata();
    let Some(raw) = read_json::<RawDocs>(&path)? else { return Ok(None) };
    let mut docs = DocumentStore::new();
    for (key, meta) in raw {
        let doc_id = parse_doc_id(&key).with_context(|| format!("in {}", path.display()))?;
        docs.insert(doc_id, meta);
    }
    Ok(Some(docs))
}

/// Document ids are persisted as JSON object keys; anything but a plain decimal integer is rejected.
pub fn parse_doc_id(key: &str) -> Result<DocId> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return Err(anyhow!("malformed document id {key:?}"));
    }
    key.parse::<DocId>().map_err(|e| anyhow!("malformed document id {key:?}: {e}"))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, value).with_context(|| format!("writing {}", path.display()))?;
    w.flush().with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() { return Ok(None); }
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(value))
}
