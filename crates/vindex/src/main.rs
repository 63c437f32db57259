//! # vindex CLI
//!
//! Command-line interface for vindex RediSearch vector indexes.
//!
//! ## Commands
//!
//! - `vindex status` - Show whether the index holds records
//! - `vindex insert <FILE>` - Insert records from a JSON array
//! - `vindex search --vector 0.1,0.2,...` - Nearest-neighbor search
//! - `vindex config show|init|path` - Manage configuration
//!
//! ## Examples
//!
//! ```bash
//! # Write a starting config
//! vindex config init > ~/.config/vindex/config.toml
//!
//! # Insert records: [{"id": "a", "values": [...], "metadata": {...}}]
//! vindex insert records.json
//!
//! # Search with a pre-filter, JSON output
//! vindex --format json search --vector 0.1,0.2,0.3 --prefilter "@lang:{rust}"
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use vindex::{open_index, Config};
use vindex_core::{Data, Index, RedisFilter, SearchResult};

#[derive(Parser)]
#[command(name = "vindex")]
#[command(about = "Vector search over RediSearch")]
#[command(version)]
struct Cli {
    /// Path to config file (default: ~/.config/vindex/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show index status
    Status,

    /// Insert records from a JSON file
    Insert {
        /// JSON array of records
        file: PathBuf,
    },

    /// Search the index
    Search {
        /// Query vector, comma separated
        #[arg(long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
        vector: Vec<f64>,

        /// Maximum results (default from config)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// RediSearch query expression applied before KNN
        #[arg(long)]
        prefilter: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Print sample configuration file
    Init,
    /// Show config file path
    Path,
}

/// Output structure for status.
#[derive(Serialize)]
struct StatusOutput {
    index: String,
    url: String,
    empty: bool,
}

/// Output structure for inserts.
#[derive(Serialize)]
struct InsertOutput {
    ids: Vec<String>,
}

/// Output structure for search results.
#[derive(Serialize)]
struct SearchOutput {
    results: Vec<SearchResult>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if let Some(ref path) = cli.config {
        Config::load_from(Some(path.clone()))
            .with_context(|| format!("Failed to load config from {}", path.display()))?
    } else {
        Config::load().context("Failed to load config")?
    };

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        config.logging.level.parse().unwrap_or(Level::INFO)
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match cli.command {
        Commands::Status => {
            let index = open_index(&config)
                .await
                .context("Failed to open index")?;
            let empty = index.is_empty().await.context("Failed to read index")?;

            match cli.format {
                OutputFormat::Json => {
                    let output = StatusOutput {
                        index: config.redis.index_name.clone(),
                        url: config.redis.url.clone(),
                        empty,
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Text => {
                    println!("Index Status for {}", config.redis.index_name);
                    println!("  Server: {}", config.redis.url);
                    println!("  Empty:  {empty}");
                }
            }
        }

        Commands::Insert { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let records: Vec<Data> = serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse records in {}", file.display()))?;

            info!("Inserting {} records from {:?}", records.len(), file);

            let index = open_index(&config)
                .await
                .context("Failed to open index")?;
            let ids = index
                .insert(&records)
                .await
                .context("Failed to insert records")?;

            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&InsertOutput { ids })?);
                }
                OutputFormat::Text => {
                    println!("Inserted {} records", ids.len());
                    for id in ids {
                        println!("  {id}");
                    }
                }
            }
        }

        Commands::Search {
            vector,
            top_k,
            prefilter,
        } => {
            let mut options = config.search_options(top_k);
            if let Some(expression) = prefilter {
                options = options.with_filter(RedisFilter::new().with_prefilter(expression));
            }

            let index = open_index(&config)
                .await
                .context("Failed to open index")?;
            let results = index
                .search(&vector, &options)
                .await
                .context("Search failed")?;

            match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&SearchOutput { results })?
                    );
                }
                OutputFormat::Text => {
                    if results.is_empty() {
                        println!("No results found.");
                    }
                    for (i, result) in results.iter().enumerate() {
                        println!("{}. {} (score: {:.4})", i + 1, result.data.id, result.score);
                        let mut keys: Vec<_> = result.data.metadata.keys().collect();
                        keys.sort();
                        for key in keys {
                            println!("   {key}: {}", result.data.metadata[key]);
                        }
                    }
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&config)
                            .context("Failed to serialize config")?
                    );
                }
                OutputFormat::Text => {
                    println!(
                        "{}",
                        toml::to_string_pretty(&config).context("Failed to serialize config")?
                    );
                }
            },
            ConfigAction::Init => {
                print!("{}", Config::sample_toml());
            }
            ConfigAction::Path => {
                if let Some(path) = Config::config_path() {
                    println!("{}", path.display());
                } else {
                    println!("Could not determine config directory");
                }
            }
        },
    }

    Ok(())
}
