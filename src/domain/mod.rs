/// Domain module containing core business logic and data types
///
/// This module defines the core entities (HabitRecord, Avatar) and the pure
/// streak engine that derives statistics from a habit's completed dates.
/// Nothing in here performs I/O.

pub mod avatar;
pub mod calendar;
pub mod habit;
pub mod streak;
pub mod types;

// Re-export public types for easy access
pub use avatar::*;
pub use calendar::*;
pub use habit::*;
pub use streak::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid reminder time: {0}")]
    InvalidReminderTime(String),

    #[error("Accessory '{accessory}' unlocks at a {required}-day streak (best so far: {best})")]
    LockedAccessory {
        accessory: String,
        required: u32,
        best: u32,
    },
}
