use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use search_core::{Indexer, RetrievalEngine};
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// One pre-fetched page: the URL and its already extracted text.
#[derive(Debug, Deserialize)]
struct InputDoc {
    url: String,
    #[serde(alias = "text")]
    body: String,
}

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and query a term-frequency inverted index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index pre-fetched pages from JSON/JSONL files or a directory of them
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Index directory
        #[arg(long, default_value = "./index")]
        index: String,
        /// Continue from the index already stored in the index directory
        #[arg(long, default_value_t = false)]
        append: bool,
    },
    /// Search the index and print ranked URLs
    Search {
        /// Index directory
        #[arg(long, default_value = "./index")]
        index: String,
        /// Query text
        query: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, index, append } => build_index(Path::new(&input), &index, append),
        Commands::Search { index, query } => search(&index, &query),
    }
}

fn build_index(input: &Path, output: &str, append: bool) -> Result<()> {
    let mut indexer = if append { Indexer::open(output)? } else { Indexer::new(output) };
    let start_id = indexer.next_doc_id();

    for file in input_files(input) {
        let added = match file.extension().and_then(|s| s.to_str()) {
            Some("jsonl") => index_jsonl(&file, &mut indexer)?,
            _ => index_json(&file, &mut indexer)?,
        };
        tracing::info!(file = %file.display(), added, "ingested file");
    }

    let added = indexer.next_doc_id() - start_id;
    if added == 0 {
        println!("No documents were indexed.");
        return Ok(());
    }
    indexer.save()?;
    tracing::info!(output, added, "index build complete");
    println!("Indexed {added} documents into {output}.");
    Ok(())
}

fn input_files(input: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        tracing::warn!(input = %input.display(), "input path not found");
    }
    files
}

fn index_jsonl(file: &Path, indexer: &mut Indexer) -> Result<usize> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    let mut added = 0;
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc: InputDoc = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", file.display(), n + 1))?;
        indexer.add_document(&doc.url, &doc.body)?;
        added += 1;
    }
    Ok(added)
}

fn index_json(file: &Path, indexer: &mut Indexer) -> Result<usize> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    let json: serde_json::Value = serde_json::from_reader(reader).with_context(|| format!("parsing {}", file.display()))?;
    let docs: Vec<InputDoc> = match json {
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<_, _>>()
            .with_context(|| format!("parsing {}", file.display()))?,
        serde_json::Value::Object(_) => vec![serde_json::from_value(json).with_context(|| format!("parsing {}", file.display()))?],
        _ => Vec::new(),
    };
    for doc in &docs {
        indexer.add_document(&doc.url, &doc.body)?;
    }
    Ok(docs.len())
}

fn search(index: &str, query: &str) -> Result<()> {
    let mut engine = RetrievalEngine::new(index);
    if !engine.load_index()? {
        println!("Index not found. Please crawl some data first.");
        return Ok(());
    }

    let results = engine.search(query);
    println!("\nResults for '{query}':");
    if results.is_empty() {
        println!("No results found.");
    }
    for (i, hit) in results.iter().enumerate() {
        println!("{}. {} (Score: {})", i + 1, hit.url, hit.score);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn builds_from_json_and_jsonl() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        fs::write(
            input.path().join("a.jsonl"),
            "{\"url\": \"https://a\", \"body\": \"fox fox\"}\n\n{\"url\": \"https://b\", \"text\": \"dog\"}\n",
        )
        .unwrap();
        fs::write(input.path().join("b.json"), r#"[{"url": "https://c", "body": "fox dog"}]"#).unwrap();
        fs::write(input.path().join("ignored.txt"), "fox").unwrap();

        let output = out.path().to_string_lossy().to_string();
        build_index(input.path(), &output, false).unwrap();

        let mut engine = RetrievalEngine::new(out.path());
        assert!(engine.load_index().unwrap());
        assert_eq!(engine.num_documents(), 3);
        let urls: Vec<String> = engine.search("fox").into_iter().map(|h| h.url).collect();
        assert_eq!(urls, vec!["https://a", "https://c"]);
    }

    #[test]
    fn append_keeps_existing_documents() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let file = input.path().join("one.json");
        fs::write(&file, r#"{"url": "https://a", "body": "fox"}"#).unwrap();
        let output = out.path().to_string_lossy().to_string();

        build_index(&file, &output, false).unwrap();
        build_index(&file, &output, true).unwrap();

        let indexer = Indexer::open(out.path()).unwrap();
        assert_eq!(indexer.documents().len(), 2);
        assert_eq!(indexer.next_doc_id(), 2);
    }

    #[test]
    fn bad_record_is_an_error() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let file = input.path().join("bad.jsonl");
        fs::write(&file, "{\"url\": \"https://a\"}\n").unwrap();
        assert!(build_index(&file, &out.path().to_string_lossy(), false).is_err());
    }
}
