/// Public library interface for the habit-streaks server
///
/// This module exports the streak engine, the storage layer, the tools and
/// the MCP server so they can be used by the binary, other applications or
/// tests.

use std::path::Path;
use thiserror::Error;

// Internal modules
mod analytics;
mod domain;
mod reminders;
mod storage;

pub mod mcp;
pub mod tools;

// Re-export public modules and types
pub use analytics::{AnalyticsEngine, UserSummary};
pub use domain::*;
pub use reminders::{Reminder, ReminderRegistry, ScheduledReminder};
pub use storage::{HabitMutation, HabitStorage, SqliteStorage, StorageError};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] storage::StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Habit server state shared by every request
///
/// Owns the SQLite storage, the analytics engine and the user that tool
/// calls act on behalf of.
pub struct HabitServer {
    storage: SqliteStorage,
    analytics: AnalyticsEngine,
    user_id: UserId,
}

impl HabitServer {
    /// Open (or create) the database at `db_path` and act as `user_id`
    ///
    /// Pending schema migrations run before this returns.
    pub fn new(db_path: impl AsRef<Path>, user_id: UserId) -> Result<Self, ServerError> {
        tracing::info!(
            "Initializing habit server with database: {:?}",
            db_path.as_ref()
        );

        let storage = SqliteStorage::new(db_path)?;
        Ok(Self::with_storage(storage, user_id))
    }

    /// Build a server around an already opened storage
    pub fn with_storage(storage: SqliteStorage, user_id: UserId) -> Self {
        Self {
            storage,
            analytics: AnalyticsEngine::new(),
            user_id,
        }
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// Blocks until stdin is closed or an error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting MCP server for user '{}'...", self.user_id);

        let habits = self.storage.list_habits(&self.user_id)?;
        tracing::info!("Server started successfully, found {} existing habits", habits.len());

        let mut mcp_server = mcp::McpServer::new(self)?;
        mcp_server.run().await?;

        Ok(())
    }

    /// Get a reference to the storage layer
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    /// Get a reference to the analytics engine
    pub fn analytics(&self) -> &AnalyticsEngine {
        &self.analytics
    }

    /// The user tool calls act as
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}
