//! quotesync command-line entry point.
//!
//! # Responsibility
//! - Wire config, logging, durable storage and the remote store together.
//! - Map each subcommand onto one core use-case.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use quotesync_core::{
    core_version, export_to_dir, import_from_file, init_logging, AppConfig, HttpRemoteStore,
    MemoryKeyValueStore, Quote, QuoteBook, QuoteRepository, Reconciler, SqliteKeyValueStore,
    SyncReport, SyncScheduler,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Parser, Debug)]
#[command(name = "quotesync")]
#[command(version)]
#[command(about = "Local quote collection with remote sync", long_about = None)]
struct Args {
    /// Config file (TOML); defaults to the platform config directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List quotes, optionally restricted to one category
    List {
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Show the selectable categories
    Categories,

    /// Add a quote
    Add {
        text: String,
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Remove a quote by id
    Remove { id: i64 },

    /// Show a random quote (uses the saved filter when no category is given)
    Random {
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Save the category filter
    Select { category: String },

    /// Write quotes.json into a directory
    Export {
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Import quotes from a JSON file
    Import { file: PathBuf },

    /// Run one sync with the remote store
    Sync,

    /// Sync periodically until Ctrl-C
    Watch,

    /// Print the core version
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Commands::Version = args.command {
        print_version();
        return Ok(());
    }

    let config = load_config(args.config.as_deref())?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir).context("failed to initialize logging")?;
    }

    let db_path = config.resolved_db_path();
    let durable = SqliteKeyValueStore::open(&db_path)
        .with_context(|| format!("failed to open store at {}", db_path.display()))?;
    // One process is one session, so `lastQuote` never outlives a command.
    let repo = QuoteRepository::new(Arc::new(durable), Arc::new(MemoryKeyValueStore::new()));
    let mut book = QuoteBook::load(repo).context("failed to load quotes")?;

    match args.command {
        Commands::List { category } => {
            let category = match category {
                Some(category) => category,
                None => book.selected_category()?,
            };
            for quote in book.filtered(&category) {
                print_quote(quote);
            }
        }
        Commands::Categories => {
            let selected = book.selected_category()?;
            for category in book.categories() {
                let marker = if category == selected { "*" } else { " " };
                println!("{marker} {category}");
            }
        }
        Commands::Add { text, category } => {
            let quote = book.add_quote(&text, category.as_deref())?;
            println!("added quote {} locally; run `quotesync sync` to push it", quote.id);
        }
        Commands::Remove { id } => {
            let removed = book.remove_quote(id)?;
            println!("removed quote {}", removed.id);
        }
        Commands::Random { category } => {
            let category = match category {
                Some(category) => category,
                None => book.selected_category()?,
            };
            match book.show_random(&category, &mut rand::thread_rng())? {
                Some(quote) => print_quote(&quote),
                None => println!("No quotes in this category."),
            }
        }
        Commands::Select { category } => {
            book.select_category(&category)?;
            println!("selected category: {}", book.selected_category()?);
        }
        Commands::Export { dir } => {
            let path = export_to_dir(&dir, book.quotes())?;
            println!("exported {} quotes to {}", book.len(), path.display());
        }
        Commands::Import { file } => {
            let summary = import_from_file(&mut book, &file)?;
            println!(
                "imported {} quotes ({} skipped); remember to sync",
                summary.imported, summary.skipped
            );
        }
        Commands::Sync => {
            let reconciler = build_reconciler(&config, book)?;
            let report = reconciler.sync().await?;
            print_report(&report);
        }
        Commands::Watch => {
            let reconciler = Arc::new(build_reconciler(&config, book)?);
            let handle = SyncScheduler::start(Arc::clone(&reconciler), config.sync_interval());
            println!(
                "syncing every {}s; press Ctrl-C to stop",
                config.sync_interval_secs
            );
            tokio::signal::ctrl_c()
                .await
                .context("failed to listen for Ctrl-C")?;
            let stats = handle.stop().await.context("sync task panicked")?;
            info!(
                "event=watch_stop module=cli status=ok cycles={}",
                stats.cycles
            );
            println!(
                "stopped after {} cycles ({} ok, {} failed)",
                stats.cycles, stats.succeeded, stats.failed
            );
        }
        Commands::Version => print_version(),
    }

    Ok(())
}

fn print_version() {
    println!("quotesync_core version={}", core_version());
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match AppConfig::default_path() {
            Some(path) => path,
            None => return Ok(AppConfig::default()),
        },
    };
    AppConfig::load(&path).with_context(|| format!("failed to load {}", path.display()))
}

fn build_reconciler(config: &AppConfig, book: QuoteBook) -> Result<Reconciler<HttpRemoteStore>> {
    let remote = HttpRemoteStore::new(&config.endpoint, config.request_timeout())?;
    Ok(Reconciler::new(
        remote,
        Arc::new(Mutex::new(book)),
        config.page_limit,
    ))
}

fn print_quote(quote: &Quote) {
    let sync_marker = if quote.synced { "" } else { " (unsynced)" };
    println!(
        "[{}] \"{}\" - {}{}",
        quote.id, quote.text, quote.category, sync_marker
    );
}

fn print_report(report: &SyncReport) {
    println!(
        "synced: fetched {}, added {}, conflicts resolved {}, pushed {}/{}",
        report.fetched,
        report.added,
        report.conflicts,
        report.pushed(),
        report.pushes.len()
    );
    for failure in report.push_failures() {
        if let Err(err) = &failure.result {
            println!("  quote {} not pushed: {}", failure.id, err);
        }
    }
}
