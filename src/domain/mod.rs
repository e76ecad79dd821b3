/// Domain module containing core business logic and data types
///
/// This module defines the core records (users, workouts, goals, progress
/// measurements) with their validation rules, plus the streak and
/// achievement calculations derived from workout history.

pub mod types;
pub mod user;
pub mod workout;
pub mod goal;
pub mod progress;
pub mod streak;
pub mod achievement;

// Re-export public types for easy access
pub use types::*;
pub use user::*;
pub use workout::*;
pub use goal::*;
pub use progress::*;
pub use streak::*;
pub use achievement::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },

    #[error("Invalid status: {0}")]
    InvalidStatus(String),
}
