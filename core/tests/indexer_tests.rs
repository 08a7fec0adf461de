use search_core::persist::{load_documents, load_index};
use search_core::tokenizer::tokenize;
use search_core::Indexer;
use std::fs;
use tempfile::tempdir;

const CORPUS: &[(&str, &str)] = &[
    ("https://example.com/a", "The quick brown fox jumps over the lazy dog."),
    ("https://example.com/b", "A fox, a fox, and another FOX!"),
    ("https://example.com/c", "Dogs don't chase cats; cats chase mice."),
    ("https://example.com/a", "Second snapshot of page a: brown bears."),
];

fn build(indexer: &mut Indexer) {
    for (url, text) in CORPUS {
        indexer.add_document(url, text).unwrap();
    }
}

#[test]
fn doc_ids_are_assigned_in_order() {
    let dir = tempdir().unwrap();
    let mut indexer = Indexer::new(dir.path());
    for (n, (url, text)) in CORPUS.iter().enumerate() {
        assert_eq!(indexer.add_document(url, text).unwrap(), n as u32);
    }
    // re-indexing a URL allocates a fresh record
    assert_eq!(indexer.documents().get(0).unwrap().url, indexer.documents().get(3).unwrap().url);
    assert_eq!(indexer.documents().len(), 4);
}

#[test]
fn postings_match_tokenized_content() {
    let dir = tempdir().unwrap();
    let mut indexer = Indexer::new(dir.path());
    build(&mut indexer);

    for (doc_id, (_, text)) in CORPUS.iter().enumerate() {
        let terms = tokenize(text);
        for term in &terms {
            let expected = terms.iter().filter(|t| *t == term).count() as u32;
            let got = indexer.index().postings(term).and_then(|p| p.get(&(doc_id as u32))).copied();
            assert_eq!(got, Some(expected), "term {term:?} in doc {doc_id}");
        }
    }
    for (term, postings) in indexer.index().iter() {
        for (doc_id, count) in postings {
            assert!(*count >= 1);
            assert!(tokenize(CORPUS[*doc_id as usize].1).iter().any(|t| t == term));
        }
    }
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let mut indexer = Indexer::new(dir.path());
    build(&mut indexer);
    indexer.save().unwrap();

    let reloaded = Indexer::open(dir.path()).unwrap();
    assert_eq!(reloaded.index(), indexer.index());
    assert_eq!(reloaded.documents(), indexer.documents());
    assert_eq!(reloaded.next_doc_id(), 4);

    let paths = indexer.paths();
    assert_eq!(load_index(paths).unwrap().as_ref(), Some(indexer.index()));
    assert_eq!(load_documents(paths).unwrap().as_ref(), Some(indexer.documents()));
}

#[test]
fn load_continues_the_id_sequence() {
    let dir = tempdir().unwrap();
    let mut first = Indexer::new(dir.path());
    first.add_document("https://one", "alpha").unwrap();
    first.add_document("https://two", "beta").unwrap();
    first.save().unwrap();

    let mut second = Indexer::open(dir.path()).unwrap();
    assert_eq!(second.add_document("https://three", "gamma").unwrap(), 2);
    second.save().unwrap();

    let third = Indexer::open(dir.path()).unwrap();
    assert_eq!(third.documents().len(), 3);
    assert_eq!(third.index().postings("alpha").unwrap().get(&0), Some(&1));
    assert_eq!(third.index().postings("gamma").unwrap().get(&2), Some(&1));
}

#[test]
fn next_id_follows_the_highest_persisted_id() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("metadata.json"), r#"{"3": {"url": "https://x"}, "10": {"url": "https://y"}}"#).unwrap();
    let indexer = Indexer::open(dir.path()).unwrap();
    assert_eq!(indexer.next_doc_id(), 11);
    assert!(indexer.index().is_empty());
}

#[test]
fn loading_an_empty_directory_starts_fresh() {
    let dir = tempdir().unwrap();
    let mut indexer = Indexer::open(dir.path()).unwrap();
    assert!(indexer.documents().is_empty());
    assert_eq!(indexer.add_document("https://a", "word").unwrap(), 0);
}

#[test]
fn malformed_doc_id_fails_the_load() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("metadata.json"), r#"{"zero": {"url": "https://x"}}"#).unwrap();
    let err = Indexer::open(dir.path()).err().expect("load should fail");
    assert!(format!("{err:#}").contains("malformed document id"));

    fs::write(dir.path().join("metadata.json"), "{}").unwrap();
    fs::write(dir.path().join("index_data.json"), r#"{"fox": {"1x": 2}}"#).unwrap();
    assert!(Indexer::open(dir.path()).is_err());
}

#[test]
fn zero_count_fails_the_load() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("index_data.json"), r#"{"fox": {"0": 0}}"#).unwrap();
    assert!(Indexer::open(dir.path()).is_err());
}

#[test]
fn save_into_unwritable_location_errors() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "file").unwrap();
    let mut indexer = Indexer::new(blocker.join("index"));
    indexer.add_document("https://a", "word").unwrap();
    assert!(indexer.save().is_err());
}

#[test]
fn highest_possible_doc_id_fails_the_load() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("metadata.json"), r#"{"4294967295": {"url": "https://x"}}"#).unwrap();
    let err = Indexer::open(dir.path()).err().expect("load should fail");
    assert!(format!("{err:#}").contains("no id to allocate"));
}

#[test]
fn exhausted_id_space_never_reuses_an_id() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("metadata.json"),
        r#"{"0": {"url": "https://a"}, "4294967293": {"url": "https://b"}}"#,
    )
    .unwrap();
    let mut indexer = Indexer::open(dir.path()).unwrap();
    assert_eq!(indexer.add_document("https://c", "fox").unwrap(), 4_294_967_294);
    assert!(indexer.add_document("https://d", "dog").is_err());

    assert_eq!(indexer.documents().len(), 3);
    assert_eq!(indexer.documents().get(0).unwrap().url, "https://a");
    assert!(!indexer.index().contains_term("dog"));
    assert_eq!(indexer.next_doc_id(), u32::MAX);
}
