//! bookbinder - command line front end for the book assembly engine

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use bookbinder::{
    BatchRunner, BookAssembler, ConfigStore, Fetcher, LogProgress, PacingPolicy,
    ProgressReporter, build_export,
};

#[derive(Parser)]
#[command(name = "bookbinder")]
#[command(version, about = "Assembles multi-page online books into printable documents")]
struct Cli {
    /// Options file (defaults to the platform configuration directory)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble one book
    Book {
        /// Index page URL of the book
        url: String,

        /// Directory the export file is written to
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,

        /// Emit the composite markup on stdout instead of writing a
        /// self-contained export file
        #[arg(long)]
        print: bool,
    },
    /// Discover accessible books on a sources index and assemble them all
    Batch {
        /// Sources index URL
        index_url: String,

        /// Directory the export files are written to
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let store = match &cli.config {
        Some(path) => ConfigStore::new(path),
        None => ConfigStore::default_location()?,
    };
    let mut config = store.load()?;

    match cli.command {
        Command::Book {
            url,
            out_dir,
            print,
        } => {
            if print {
                config.download_html = false;
            }
            let fetcher = Fetcher::new();
            let progress: Arc<dyn ProgressReporter> = Arc::new(LogProgress);
            let pacing = PacingPolicy::from_config(&config);

            let assembler =
                BookAssembler::new(url, config.clone(), fetcher.clone(), Arc::clone(&progress));
            let book = assembler.assemble().await?;

            if config.download_html {
                let export = build_export(&fetcher, &pacing, progress.as_ref(), &book).await;
                std::fs::create_dir_all(&out_dir)
                    .with_context(|| format!("Failed to create {}", out_dir.display()))?;
                let path = out_dir.join(export.file_name);
                std::fs::write(&path, export.html)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("{}", path.display());
            } else {
                println!("{}", book.html);
            }
        }
        Command::Batch { index_url, out_dir } => {
            let runner = BatchRunner::new(config, Fetcher::new(), Arc::new(LogProgress));
            let candidates = runner.discover(&index_url).await?;
            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("Failed to create {}", out_dir.display()))?;
            runner.run(&candidates, &out_dir).await?;
        }
    }

    Ok(())
}
