//! CSV output: progress log rollup and full-program export.
//!
//! Rollup appends log records to a CSV archive and renames the log so a
//! record is never written twice. Export flattens the program cycle into
//! one row per day, diet and meal.

use crate::progress::{read_log, LogLock};
use crate::{DietType, Program, ProgressRecord, Result};
use std::fs::{File, OpenOptions};
use std::path::Path;

/// A row in the progress CSV
#[derive(Debug, serde::Serialize)]
struct ProgressRow {
    id: String,
    recorded_on: String,
    recorded_at: String,
    weight_kg: Option<f64>,
    fasting_blood_sugar: Option<f64>,
    postprandial_blood_sugar: Option<f64>,
}

impl From<&ProgressRecord> for ProgressRow {
    fn from(record: &ProgressRecord) -> Self {
        ProgressRow {
            id: record.id.to_string(),
            recorded_on: record.recorded_on.to_string(),
            recorded_at: record.recorded_at.to_rfc3339(),
            weight_kg: record.weight_kg,
            fasting_blood_sugar: record.fasting_blood_sugar,
            postprandial_blood_sugar: record.postprandial_blood_sugar,
        }
    }
}

/// Roll up the progress log into CSV and archive the log
///
/// The CSV is fsynced before the log is renamed to `*.processed`, so a
/// crash in between can only duplicate rows, never lose them. The log lock
/// is held from the read through the rename; appends wait and then start a
/// fresh log.
pub fn rollup_to_csv(log_path: &Path, csv_path: &Path) -> Result<usize> {
    if !log_path.exists() {
        return Ok(0);
    }

    let _lock = LogLock::exclusive(log_path)?;
    let records = read_log(log_path)?;

    if records.is_empty() {
        tracing::info!("No progress records to roll up");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Headers only on a fresh file
    let needs_headers = file.metadata()?.len() == 0;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for record in &records {
        writer.serialize(ProgressRow::from(record))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Wrote {} progress records to CSV", records.len());

    let processed_path = log_path.with_extension("jsonl.processed");
    std::fs::rename(log_path, &processed_path)?;
    tracing::info!("Archived progress log to {:?}", processed_path);

    Ok(records.len())
}

/// Remove archived `*.processed` logs from a directory
pub fn cleanup_processed_logs(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed log: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed progress logs", count);
    }

    Ok(count)
}

/// A row in the program export
#[derive(Debug, serde::Serialize)]
struct ProgramRow<'a> {
    day: u32,
    diet: DietType,
    cuisine: String,
    meal: &'a str,
    target_calories: u32,
    recipe: &'a str,
    exercise: &'a str,
    exercise_calories: u32,
    sleep_tip: &'a str,
}

/// Write the whole cycle to CSV, overwriting `path`
pub fn export_program_csv(program: &Program, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_writer(File::create(path)?);
    let mut rows = 0;

    for day in program.days() {
        for diet in DietType::ALL {
            let diet_day = day.diet_variants.get(diet);
            for meal in &diet_day.meals {
                writer.serialize(ProgramRow {
                    day: day.day_index,
                    diet,
                    cuisine: diet_day.cuisine_style.to_string(),
                    meal: &meal.name,
                    target_calories: meal.target_calories,
                    recipe: &meal.recipe,
                    exercise: &day.exercise.name,
                    exercise_calories: day.exercise.estimated_calories,
                    sleep_tip: &day.sleep_tip,
                })?;
                rows += 1;
            }
        }
    }

    writer.flush()?;
    tracing::info!("Exported {} program rows to {:?}", rows, path);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{JsonlProgressSink, Measurements, ProgressSink};
    use chrono::{NaiveDate, Utc};

    fn create_test_record(day: u32) -> ProgressRecord {
        ProgressRecord::new(
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            Utc::now(),
            Measurements {
                weight_kg: Some(80.0),
                fasting_blood_sugar: Some(110.0),
                postprandial_blood_sugar: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_rollup_creates_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("progress.jsonl");
        let csv_path = temp_dir.path().join("progress.csv");

        let mut sink = JsonlProgressSink::new(&log_path);
        for day in 1..=3 {
            sink.append(&create_test_record(day)).unwrap();
        }

        let count = rollup_to_csv(&log_path, &csv_path).unwrap();
        assert_eq!(count, 3);

        assert!(csv_path.exists());
        assert!(!log_path.exists());
        assert!(log_path.with_extension("jsonl.processed").exists());
    }

    #[test]
    fn test_rollup_appends() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("progress.jsonl");
        let csv_path = temp_dir.path().join("progress.csv");

        let mut sink = JsonlProgressSink::new(&log_path);
        sink.append(&create_test_record(1)).unwrap();
        assert_eq!(rollup_to_csv(&log_path, &csv_path).unwrap(), 1);

        let mut sink = JsonlProgressSink::new(&log_path);
        sink.append(&create_test_record(2)).unwrap();
        assert_eq!(rollup_to_csv(&log_path, &csv_path).unwrap(), 1);

        let reader = csv::Reader::from_path(&csv_path).unwrap();
        assert_eq!(reader.into_records().count(), 2);
    }

    #[test]
    fn test_rollup_keeps_concurrent_appends() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("progress.jsonl");
        let csv_path = temp_dir.path().join("progress.csv");

        let writer_path = log_path.clone();
        let writer = std::thread::spawn(move || {
            let mut sink = JsonlProgressSink::new(&writer_path);
            for i in 0..60 {
                sink.append(&create_test_record(i % 28 + 1)).unwrap();
            }
        });

        let mut rolled = 0;
        while !writer.is_finished() {
            rolled += rollup_to_csv(&log_path, &csv_path).unwrap();
        }
        writer.join().unwrap();
        rolled += rollup_to_csv(&log_path, &csv_path).unwrap();

        assert_eq!(rolled, 60);
        let reader = csv::Reader::from_path(&csv_path).unwrap();
        assert_eq!(reader.into_records().count(), 60);
    }

    #[test]
    fn test_append_between_rollups() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("progress.jsonl");
        let csv_path = temp_dir.path().join("progress.csv");

        let mut sink = JsonlProgressSink::new(&log_path);
        sink.append(&create_test_record(1)).unwrap();
        assert_eq!(rollup_to_csv(&log_path, &csv_path).unwrap(), 1);

        // Same sink after its log was archived
        sink.append(&create_test_record(2)).unwrap();
        assert_eq!(rollup_to_csv(&log_path, &csv_path).unwrap(), 1);

        let reader = csv::Reader::from_path(&csv_path).unwrap();
        assert_eq!(reader.into_records().count(), 2);
    }

    #[test]
    fn test_empty_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("empty.jsonl");
        let csv_path = temp_dir.path().join("progress.csv");

        File::create(&log_path).unwrap();

        assert_eq!(rollup_to_csv(&log_path, &csv_path).unwrap(), 0);
        assert!(!csv_path.exists());
    }

    #[test]
    fn test_cleanup_processed_logs() {
        let temp_dir = tempfile::tempdir().unwrap();

        File::create(temp_dir.path().join("a.jsonl.processed")).unwrap();
        File::create(temp_dir.path().join("b.jsonl.processed")).unwrap();
        File::create(temp_dir.path().join("keep.jsonl")).unwrap();

        assert_eq!(cleanup_processed_logs(temp_dir.path()).unwrap(), 2);
        assert!(temp_dir.path().join("keep.jsonl").exists());
    }

    #[test]
    fn test_export_program() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("program.csv");
        let program = crate::program::default_program().unwrap();

        let rows = export_program_csv(program, &path).unwrap();
        // 90 days x 2 diets x 5 meals
        assert_eq!(rows, 900);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "day");
        assert_eq!(&headers[5], "recipe");

        let first = reader.records().next().unwrap().unwrap();
        assert_eq!(&first[0], "1");
        assert_eq!(&first[1], "veg");
        assert_eq!(&first[2], "North Indian");
        assert_eq!(&first[3], "Breakfast");
    }
}
