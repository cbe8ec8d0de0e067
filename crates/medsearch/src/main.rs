mod report;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use medsearch_common::{logger, AppConfig};
use medsearch_embedding::{build_embedder, QueryPhrasing};
use medsearch_vector::{
    BulkLoader, PineconeClient, PineconeConnector, Retriever, SearchOutcome, StoreConnector,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    if let Some(root) = find_project_root() {
        let env_path = root.join(".env");
        if env_path.exists() {
            dotenv::from_path(&env_path).ok();
        }
    } else {
        dotenv::dotenv().ok();
    }
}

#[derive(Parser)]
#[command(name = "medsearch")]
#[command(about = "MedSearch - semantic medicine lookup over a vector index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (overrides SERVER_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides SERVER_PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Embed a medicine CSV and upload it to the index
    Load {
        /// CSV with at least `id` and `name` columns
        csv: PathBuf,

        /// Assume the index already exists
        #[arg(long)]
        skip_index_setup: bool,
    },

    /// Create the index if it does not exist
    SetupIndex,

    /// Look up a medicine from the terminal
    Query {
        /// Medicine name; prompts repeatedly when omitted
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    load_dotenv_from_project_root();

    let mut config = AppConfig::from_env()?;

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            if let Some(host) = host {
                config.server_host = host;
            }
            if let Some(port) = port {
                config.server_port = port;
            }
            serve(config).await?;
        }
        None => serve(config).await?,
        Some(Commands::Load {
            csv,
            skip_index_setup,
        }) => {
            logger::setup_console_logging(&config.log_level)?;
            if !skip_index_setup {
                setup_index(&config).await?;
            }
            load(&config, &csv).await?;
        }
        Some(Commands::SetupIndex) => {
            logger::setup_console_logging(&config.log_level)?;
            setup_index(&config).await?;
        }
        Some(Commands::Query { name }) => {
            logger::setup_console_logging(&config.log_level)?;
            query(&config, name).await?;
        }
    }

    Ok(())
}

async fn serve(config: AppConfig) -> Result<()> {
    logger::setup_logging(&config.log_dir, &config.log_level)?;

    tracing::info!("MedSearch starting...");
    tracing::info!("Configuration loaded:");
    tracing::info!("  Index: {}", config.index.name);
    tracing::info!("  Embedding: {} ({})", config.embedding_model, config.embedding_backend);
    tracing::info!("  Static files: {}", config.static_dir.display());

    println!("Server listening on http://{}", config.server_bind_address());

    medsearch_server::start_server(config).await?;
    Ok(())
}

async fn setup_index(config: &AppConfig) -> Result<()> {
    let client = PineconeClient::from_config(config)?;
    let index = client
        .ensure_index(&config.index)
        .await
        .with_context(|| format!("Failed to provision index '{}'", config.index.name))?;

    println!("Index '{}' ready at {}", index.name, index.host);
    Ok(())
}

async fn load(config: &AppConfig, csv: &std::path::Path) -> Result<()> {
    let embedder = build_embedder(config)?;
    let store = PineconeConnector::from_config(config).connect().await?;

    let report = BulkLoader::new(embedder, store)
        .load_csv(csv)
        .await
        .with_context(|| format!("Failed to load {}", csv.display()))?;

    println!(
        "Uploaded {} medicines in {} batches",
        report.records, report.batches
    );
    Ok(())
}

async fn query(config: &AppConfig, name: Option<String>) -> Result<()> {
    let embedder = build_embedder(config)?;
    let retriever = Retriever::new(embedder, Arc::new(PineconeConnector::from_config(config)))
        .with_phrasing(QueryPhrasing::Catalog);

    if let Some(name) = name {
        return lookup(&retriever, &name).await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout
            .write_all(b"\nEnter medicine name to search (or 'exit' to quit): ")
            .await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("exit") {
            break;
        }
        if line.is_empty() {
            continue;
        }

        // A failed lookup should not end the session
        if let Err(e) = lookup(&retriever, line).await {
            eprintln!("Error: {:#}", e);
        }
    }

    Ok(())
}

async fn lookup(retriever: &Retriever, name: &str) -> Result<()> {
    match retriever.search(name).await? {
        SearchOutcome::Found(record) => println!("\n{}", report::render(&record)),
        SearchOutcome::NotFound => println!("No information found for '{}'", name.trim()),
    }
    Ok(())
}
