#![forbid(unsafe_code)]

//! Core program logic for the 90-day remission kit.
//!
//! This crate provides:
//! - Domain types (program days, diet variants, routines, progress records)
//! - Template library and validation
//! - Deterministic program generation
//! - Enrollment-date to program-day resolution
//! - Persistence for enrollment and progress (JSON, JSONL, CSV)

pub mod types;
pub mod error;
pub mod templates;
pub mod config;
pub mod logging;
pub mod generator;
pub mod resolver;
pub mod program;
pub mod enrollment;
pub mod progress;
pub mod csv_export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use templates::{MealTemplate, RoutineTemplate, TemplateLibrary, TemplateList, TemplateSet};
pub use config::Config;
pub use generator::{DietPlan, ProgramGenerator, ProgramSettings, SlotCalories};
pub use resolver::DayResolver;
pub use program::{default_program, Program};
pub use enrollment::Enrollment;
pub use progress::{read_records, JsonlProgressSink, Measurements, ProgressSink};
pub use csv_export::{cleanup_processed_logs, export_program_csv, rollup_to_csv};
