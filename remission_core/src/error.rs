//! Error types for the remission_core library.

use chrono::NaiveDate;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for remission_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed templates or program settings. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Requested program day lies outside `[1, cycle_length]`
    #[error("Day {day} is out of range (expected 1..={cycle_length})")]
    IndexOutOfRange { day: u32, cycle_length: u32 },

    /// Query date precedes the enrollment date
    #[error("Query date {query} is before enrollment date {enrolled}")]
    InvalidDateRange { enrolled: NaiveDate, query: NaiveDate },

    /// User-supplied input failed validation (enrollment, progress entries)
    #[error("Validation error: {0}")]
    Validation(String),

    /// No enrollment record exists yet
    #[error("Not enrolled")]
    NotEnrolled,
}
