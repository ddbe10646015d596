use anyhow::Result;
use axum::Router;
use clap::Parser;
use docsearch_core::SearchConfig;
use docsearch_server::build_app;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Corpus directory path
    #[arg(long)]
    corpus: Option<PathBuf>,
    /// Index directory path
    #[arg(long)]
    index: Option<PathBuf>,
    /// Open the existing index instead of rebuilding it on the first indexed query
    #[arg(long, default_value_t = false)]
    reuse_index: bool,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let mut config = SearchConfig::from_env();
    if let Some(dir) = args.corpus {
        config.corpus_dir = dir;
    }
    if let Some(dir) = args.index {
        config.index_dir = dir;
    }
    config.reuse_existing_index |= args.reuse_index;
    let app: Router = build_app(config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
