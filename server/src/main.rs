use anyhow::Result;
use clap::Parser;
use server::{load_engine, router};
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

/// Read-only HTTP search over a saved index
#[derive(Parser)]
#[command(name = "server")]
struct Args {
    /// Index directory written by the crawler or `indexer build`
    #[arg(long, default_value = "./index")]
    index: String,
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let engine = load_engine(&args.index)?;
    tracing::info!(
        index = %args.index,
        num_docs = engine.num_documents(),
        num_terms = engine.num_terms(),
        "index ready"
    );

    let listener = TcpListener::bind((args.host.as_str(), args.port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "serving search");
    axum::serve(listener, router(engine)).await?;
    Ok(())
}
