/// Public library interface for the Fitness Insights MCP server
///
/// This module exports the server implementation and the public types
/// that can be used by other applications or tests: the record types,
/// the analytics core, the insight synthesis adapters and the MCP layer.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

// Internal modules
mod domain;
mod storage;

pub mod analytics;
pub mod insights;
pub mod mcp;
pub mod tools;

// Re-export public modules and types
pub use domain::*;
pub use storage::{FitnessStorage, SqliteStorage, StorageError, WorkoutQuery};
pub use analytics::{AnalyticsEngine, AnalyticsReport, GoalPrediction, StatisticsBundle};
pub use insights::{
    GenerationError, InsightSynthesizer, InsightsResult, Prompt, TextGenerator, UnconfiguredGenerator,
    WorkoutRecommendation, WorkoutRecommender,
};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] storage::StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("Text generator setup failed: {0}")]
    Generator(#[from] insights::GenerationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Main fitness tracker server that implements the MCP protocol
///
/// Owns the record store and the insight services. The text generator is
/// injected so tests and offline setups can swap the provider out.
pub struct FitnessTrackerServer {
    storage: SqliteStorage,
    synthesizer: InsightSynthesizer,
    recommender: WorkoutRecommender,
}

impl FitnessTrackerServer {
    pub fn new(storage: SqliteStorage, generator: Arc<dyn TextGenerator>) -> Self {
        tracing::info!("Using text generator '{}'", generator.name());
        Self {
            storage,
            synthesizer: InsightSynthesizer::new(generator.clone()),
            recommender: WorkoutRecommender::new(generator),
        }
    }

    /// Open (or create) the SQLite database at `db_path` and build a server on it
    ///
    /// This will initialize the database schema if it doesn't already exist.
    pub async fn open(db_path: PathBuf, generator: Arc<dyn TextGenerator>) -> Result<Self, ServerError> {
        tracing::info!("Initializing Fitness Insights server with database: {:?}", db_path);
        let storage = SqliteStorage::new(db_path)?;
        Ok(Self::new(storage, generator))
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// This method will block until stdin is closed or an error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting MCP server...");

        let mut mcp_server = mcp::McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }

    /// Get a reference to the storage layer (useful for testing)
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub fn synthesizer(&self) -> &InsightSynthesizer {
        &self.synthesizer
    }

    pub fn recommender(&self) -> &WorkoutRecommender {
        &self.recommender
    }
}
