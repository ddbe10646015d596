use anyhow::Result;
use clap::Parser;
use docsearch_core::{SearchConfig, Searcher, Strategy};
use docsearch_cli::{render, run_interactive};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "docsearch")]
#[command(about = "Count a term or phrase in every .txt file of a directory", long_about = None)]
struct Args {
    /// Corpus directory (defaults to DOCSEARCH_CORPUS_DIR or ./sample_text)
    #[arg(long)]
    corpus: Option<PathBuf>,
    /// Index directory (defaults to DOCSEARCH_INDEX_DIR or ./index)
    #[arg(long)]
    index: Option<PathBuf>,
    /// Worker threads for scans, 0 = one per core
    #[arg(long)]
    workers: Option<usize>,
    /// Query an existing index instead of rebuilding it on the first indexed search
    #[arg(long, default_value_t = false)]
    reuse_index: bool,
    /// Run a single search instead of prompting
    #[arg(long)]
    term: Option<String>,
    /// Strategy for --term: 1|substring, 2|pattern, 3|indexed
    #[arg(long, default_value = "substring")]
    strategy: Strategy,
    /// Print the one-shot outcome as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let args = Args::parse();

    let mut config = SearchConfig::from_env();
    if let Some(dir) = args.corpus {
        config.corpus_dir = dir;
    }
    if let Some(dir) = args.index {
        config.index_dir = dir;
    }
    if let Some(n) = args.workers {
        config.workers = n;
    }
    config.reuse_existing_index |= args.reuse_index;
    let mut searcher = Searcher::new(config);

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    match args.term {
        Some(term) => {
            let outcome = searcher.search(&term, args.strategy)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                render(&searcher, &outcome, &mut stdout.lock(), &mut stderr.lock())?;
            }
        }
        None => {
            let stdin = std::io::stdin();
            run_interactive(&mut searcher, &mut stdin.lock(), &mut stdout.lock(), &mut stderr.lock())?;
        }
    }
    Ok(())
}
