mod fetch;

use anyhow::{Context, Result};
use clap::Parser;
use fetch::{parse_url_list, FetchedPage, Fetcher};
use search_core::Indexer;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "crawler")]
#[command(about = "Fetch a list of URLs and index their text")]
struct Cli {
    /// Path to a file with URLs to crawl (one per line)
    #[arg(long)]
    urls: String,
    /// Index directory
    #[arg(long, default_value = "./index")]
    index: String,
    /// Delay before each request, in milliseconds
    #[arg(long, default_value_t = 1000)]
    delay_ms: u64,
    /// Request timeout seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
    /// User-Agent header sent with every request
    #[arg(long, default_value = "MiniSearchEngine/1.0")]
    user_agent: String,
    /// Add to the existing index instead of replacing it
    #[arg(long, default_value_t = false)]
    append: bool,
    /// Also write fetched pages as JSONL (readable by `indexer build`)
    #[arg(long)]
    dump: Option<String>,
}

#[derive(Serialize)]
struct DumpRecord<'a> {
    url: &'a str,
    body: &'a str,
    timestamp: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();

    let contents = fs::read_to_string(&args.urls).with_context(|| format!("reading url file {}", args.urls))?;
    let urls = parse_url_list(&contents);
    tracing::info!(count = urls.len(), file = %args.urls, "loaded urls");

    let mut fetcher = Fetcher::new(
        &args.user_agent,
        Duration::from_secs(args.timeout_secs),
        Duration::from_millis(args.delay_ms),
    )?;
    let mut indexer = if args.append { Indexer::open(&args.index)? } else { Indexer::new(&args.index) };
    let mut dump = args.dump.as_deref().map(open_dump).transpose()?;

    let mut count = 0usize;
    for url in &urls {
        let Some(page) = fetcher.fetch(url).await else {
            tracing::info!(%url, "skipping");
            continue;
        };
        let doc_id = indexer.add_document(&page.url, &page.text)?;
        tracing::info!(%url, doc_id, "indexed");
        if let Some(out) = dump.as_mut() {
            write_dump(out, &page)?;
        }
        count += 1;
    }
    if let Some(mut out) = dump {
        out.flush()?;
    }

    if count == 0 {
        println!("No documents were indexed.");
        return Ok(());
    }
    indexer.save()?;
    println!("Crawled and indexed {count} of {} urls into {}.", urls.len(), args.index);
    Ok(())
}

fn open_dump(path: &str) -> Result<BufWriter<File>> {
    if let Some(dir) = Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let f = File::create(path).with_context(|| format!("creating {path}"))?;
    Ok(BufWriter::new(f))
}

fn write_dump<W: Write>(out: &mut W, page: &FetchedPage) -> Result<()> {
    let timestamp = time::OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
    let rec = DumpRecord { url: &page.url, body: &page.text, timestamp };
    serde_json::to_writer(&mut *out, &rec)?;
    out.write_all(b"\n")?;
    Ok(())
}
