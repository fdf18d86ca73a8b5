/// Storage layer for persisting habit data
///
/// This module handles all database operations using SQLite. Habits are a
/// flat record store looked up by id and by owning user.

pub mod migrations;
pub mod sqlite;

// Re-export the main storage types
pub use sqlite::*;

use thiserror::Error;

use crate::domain::{Avatar, DomainError, HabitId, HabitRecord, UserId};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("Corrupt record in {table}: {message}")]
    CorruptRecord { table: &'static str, message: String },

    #[error("Rejected change: {0}")]
    Rejected(#[from] DomainError),

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Callback applied to a habit inside [`HabitStorage::modify_habit`]
pub type HabitMutation<'a> = &'a mut dyn FnMut(&mut HabitRecord) -> Result<(), DomainError>;

/// Trait defining the storage interface for habits
///
/// This trait allows swapping SQLite for another backend while keeping the
/// same interface. It stays object safe so callers can hold a
/// `&dyn HabitStorage`.
pub trait HabitStorage {
    /// Insert a new habit
    fn create_habit(&self, habit: &HabitRecord) -> Result<(), StorageError>;

    /// Get a habit owned by `user_id`
    fn get_habit(&self, user_id: &UserId, habit_id: &HabitId) -> Result<HabitRecord, StorageError>;

    /// All habits owned by `user_id`, oldest first
    fn list_habits(&self, user_id: &UserId) -> Result<Vec<HabitRecord>, StorageError>;

    /// Every habit of every user that has a reminder time set
    fn list_habits_with_reminders(&self) -> Result<Vec<HabitRecord>, StorageError>;

    /// Persist the editable fields of a habit
    ///
    /// Completions and cached streaks are not written; those only change
    /// through [`HabitStorage::modify_habit`].
    fn update_habit(&self, habit: &HabitRecord) -> Result<(), StorageError>;

    /// Delete a habit together with its completions
    fn delete_habit(&self, user_id: &UserId, habit_id: &HabitId) -> Result<(), StorageError>;

    /// Load, mutate and save a habit as one serialized unit
    ///
    /// Two concurrent toggles on the same habit can't lose each other's
    /// update: the whole read-modify-write runs in a single write
    /// transaction. If `mutate` fails nothing is written.
    fn modify_habit(
        &self,
        user_id: &UserId,
        habit_id: &HabitId,
        mutate: HabitMutation<'_>,
    ) -> Result<HabitRecord, StorageError>;

    /// Get the avatar of a user, if one was saved
    fn get_avatar(&self, user_id: &UserId) -> Result<Option<Avatar>, StorageError>;

    /// Create or replace the avatar of a user
    fn save_avatar(&self, user_id: &UserId, avatar: &Avatar) -> Result<(), StorageError>;
}
