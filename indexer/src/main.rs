use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use docsearch_core::tokenizer::normalize;
use docsearch_core::{build_index, IndexReader, PostingsSource};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and inspect the positional index of a text corpus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recreate the index from every .txt file directly inside a directory
    Build {
        /// Corpus directory
        #[arg(long)]
        input: PathBuf,
        /// Output index directory (replaced wholesale)
        #[arg(long, default_value = "./index")]
        output: PathBuf,
        /// Print the build report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the posting lists stored for a term
    Inspect {
        /// Index directory
        #[arg(long, default_value = "./index")]
        index: PathBuf,
        /// Term to look up (normalized before lookup)
        #[arg(long)]
        term: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, json } => build(&input, &output, json),
        Commands::Inspect { index, term } => inspect(&index, &term),
    }
}

fn build(input: &Path, output: &Path, json: bool) -> Result<()> {
    let report = build_index(input, output)?;
    for diag in &report.diagnostics {
        eprintln!("{diag}");
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("indexed {} document(s) into {} in {} ms", report.documents.len(), output.display(), report.elapsed.as_millis());
        for name in &report.documents {
            println!("\t{name}");
        }
    }
    if report.is_empty() {
        bail!("no documents indexed from {}", input.display());
    }
    Ok(())
}

fn inspect(index: &Path, term: &str) -> Result<()> {
    let reader = IndexReader::open(index)?;
    let term = normalize(term);
    if term.is_empty() || term.contains(' ') {
        bail!("expected a single word, got {term:?}");
    }
    println!("{term}: {} document(s) of {}", reader.doc_freq(&term), reader.meta().num_docs);
    for p in reader.postings(&term)? {
        match reader.documents().get(p.doc_id as usize) {
            Some(doc) => println!("\t{} ({} tokens) {:?}", doc.name, doc.num_tokens, p.positions),
            None => println!("\t<unknown doc {}> {:?}", p.doc_id, p.positions),
        }
    }
    Ok(())
}
