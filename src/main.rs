/// Main entry point for the Fitness Insights MCP server
///
/// This file sets up logging, parses command line arguments, picks a text
/// generator and starts the MCP server. The server listens for JSON-RPC
/// requests over stdin/stdout following the MCP protocol.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fitness_insights_mcp::insights::openai::{OpenAiConfig, OpenAiGenerator, DEFAULT_BASE_URL, DEFAULT_MODEL};
use fitness_insights_mcp::{FitnessTrackerServer, TextGenerator, UnconfiguredGenerator};

/// Directories to try for the default database, most preferred first
fn database_dir_candidates() -> Vec<PathBuf> {
    [
        // 1. Platform data directory (preferred)
        dirs::data_dir().map(|p| p.join("fitness_insights")),
        // 2. Platform config directory
        dirs::config_dir().map(|p| p.join("fitness_insights")),
        // 3. Current working directory (last resort before temp)
        std::env::current_dir().ok().map(|p| p.join(".fitness_insights")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Get the default database path with robust fallback strategy
fn get_default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    for potential_path in database_dir_candidates() {
        if std::fs::create_dir_all(&potential_path).is_ok() {
            // Make sure the directory is actually writable
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                return Ok(potential_path.join("fitness.db"));
            }
        }
    }

    // Ultimate fallback: use a temporary directory
    let mut temp_path = std::env::temp_dir();
    temp_path.push("fitness_insights");
    std::fs::create_dir_all(&temp_path)?;
    temp_path.push("fitness.db");

    warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path)
}

/// Command line arguments for the Fitness Insights MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long, env = "FITNESS_DB_PATH")]
    database: Option<PathBuf>,

    /// API key for the OpenAI-compatible provider; AI features fall back to
    /// canned responses when absent
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Chat model used for insights and recommendations
    #[arg(long, env = "FITNESS_LLM_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "FITNESS_LLM_BASE_URL", default_value = DEFAULT_BASE_URL)]
    llm_base_url: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

fn build_generator(args: &Args) -> Result<Arc<dyn TextGenerator>, Box<dyn std::error::Error>> {
    match args.openai_api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => {
            let config = OpenAiConfig::new(key)
                .with_model(args.model.clone())
                .with_base_url(args.llm_base_url.clone());
            let generator = OpenAiGenerator::new(config)?;
            info!("AI insights enabled with model {}", generator.model());
            Ok(Arc::new(generator))
        }
        _ => {
            warn!("OPENAI_API_KEY not set; insights and recommendations will use fallback responses");
            Ok(Arc::new(UnconfiguredGenerator))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fitness_insights_mcp={}", log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr) // stdout carries the protocol
        .init();

    info!("Starting Fitness Insights MCP server");

    let db_path = match args.database.clone() {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => get_default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let generator = build_generator(&args)?;
    let server = FitnessTrackerServer::open(db_path, generator).await?;

    server.run().await?;

    info!("Fitness Insights MCP server shutdown complete");
    Ok(())
}
