//! Progress log for weight and blood sugar measurements.
//!
//! Records are appended to a JSONL (JSON Lines) file with file locking
//! so concurrent writers never interleave lines. The lock is held on a
//! sidecar `*.lock` file, which stays in place when rollup renames the log.

use crate::{Error, ProgressRecord, Result};
use chrono::{DateTime, NaiveDate, Utc};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Measurements entered by the user for one day
#[derive(Clone, Debug, Default)]
pub struct Measurements {
    pub weight_kg: Option<f64>,
    pub fasting_blood_sugar: Option<f64>,
    pub postprandial_blood_sugar: Option<f64>,
}

impl ProgressRecord {
    /// Validate measurements and stamp a new record
    pub fn new(
        recorded_on: NaiveDate,
        recorded_at: DateTime<Utc>,
        measurements: Measurements,
    ) -> Result<Self> {
        let fields = [
            ("weight_kg", measurements.weight_kg),
            ("fasting_blood_sugar", measurements.fasting_blood_sugar),
            ("postprandial_blood_sugar", measurements.postprandial_blood_sugar),
        ];

        if fields.iter().all(|(_, v)| v.is_none()) {
            return Err(Error::Validation(
                "At least one measurement is required".into(),
            ));
        }

        for (label, value) in fields {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(Error::Validation(format!(
                        "{} must be a positive number, got {}",
                        label, v
                    )));
                }
            }
        }

        Ok(ProgressRecord {
            id: Uuid::new_v4(),
            recorded_on,
            recorded_at,
            weight_kg: measurements.weight_kg,
            fasting_blood_sugar: measurements.fasting_blood_sugar,
            postprandial_blood_sugar: measurements.postprandial_blood_sugar,
        })
    }
}

/// Progress sink trait for persisting records
pub trait ProgressSink {
    fn append(&mut self, record: &ProgressRecord) -> Result<()>;
}

/// JSONL-based progress sink with file locking
pub struct JsonlProgressSink {
    path: PathBuf,
}

impl JsonlProgressSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl ProgressSink for JsonlProgressSink {
    fn append(&mut self, record: &ProgressRecord) -> Result<()> {
        self.ensure_parent_dir()?;

        // Open under the lock so a concurrent rollup can't archive the file
        // between open and write.
        let _lock = LogLock::exclusive(&self.path)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        tracing::debug!("Appended progress record {} to log", record.id);
        Ok(())
    }
}

/// Advisory lock guarding a progress log, released on drop
pub(crate) struct LogLock {
    file: File,
}

impl LogLock {
    pub(crate) fn exclusive(log_path: &Path) -> Result<Self> {
        let file = Self::open(log_path)?;
        file.lock_exclusive()?;
        Ok(Self { file })
    }

    pub(crate) fn shared(log_path: &Path) -> Result<Self> {
        let file = Self::open(log_path)?;
        file.lock_shared()?;
        Ok(Self { file })
    }

    fn open(log_path: &Path) -> Result<File> {
        let mut name = log_path.as_os_str().to_owned();
        name.push(".lock");
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(PathBuf::from(name))?;
        Ok(file)
    }
}

impl Drop for LogLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!("Failed to release progress log lock: {}", e);
        }
    }
}

/// Read all records from a progress log, oldest date first
///
/// Lines that are not valid UTF-8 or not a valid record are skipped with
/// a warning.
pub fn read_records(path: &Path) -> Result<Vec<ProgressRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let _lock = LogLock::shared(path)?;
    read_log(path)
}

/// Read a progress log; the caller must hold its [`LogLock`]
pub(crate) fn read_log(path: &Path) -> Result<Vec<ProgressRecord>> {
    let file = match File::open(path) {
        Ok(file) => file,
        // Archived by a rollup since the caller checked
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut records = Vec::new();

    for (line_num, line_result) in BufReader::new(file).split(b'\n').enumerate() {
        let bytes = line_result?;
        let line = match std::str::from_utf8(&bytes) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Skipping non UTF-8 progress line {}: {}", line_num + 1, e);
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<ProgressRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Failed to parse progress record at line {}: {}", line_num + 1, e);
            }
        }
    }

    // Stable sort keeps entry order within a day
    records.sort_by_key(|r| r.recorded_on);
    tracing::debug!("Read {} progress records", records.len());
    Ok(records)
}
