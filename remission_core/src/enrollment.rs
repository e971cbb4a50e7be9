//! Enrollment record persistence with file locking.
//!
//! The enrollment date anchors day resolution. The record is stored as a
//! single JSON file, read under a shared lock and replaced atomically.

use crate::{Cuisine, Error, Result};
use chrono::NaiveDate;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

const COUNTRY_PREFIX: &str = "+91";
const SUBSCRIBER_DIGITS: usize = 10;

/// A registered participant
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Enrollment {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub region: Option<Cuisine>,
    pub enrolled_on: NaiveDate,
}

impl Enrollment {
    /// Validate and normalize registration details
    pub fn new(
        name: &str,
        phone: &str,
        region: Option<Cuisine>,
        enrolled_on: NaiveDate,
    ) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() || phone.trim().is_empty() {
            return Err(Error::Validation(
                "Name and phone number are required".into(),
            ));
        }

        Ok(Self {
            name: name.to_string(),
            phone: normalize_phone(phone)?,
            region,
            enrolled_on,
        })
    }

    /// Load the enrollment record with shared locking
    ///
    /// Returns `Ok(None)` if nobody has enrolled yet.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            tracing::info!("No enrollment file found at {:?}", path);
            return Ok(None);
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        let enrollment: Enrollment = serde_json::from_str(&contents)?;
        tracing::debug!("Loaded enrollment from {:?}", path);
        Ok(Some(enrollment))
    }

    /// Load the record, treating a missing file as an error
    pub fn require(path: &Path) -> Result<Self> {
        Self::load(path)?.ok_or(Error::NotEnrolled)
    }

    /// Save the enrollment record with exclusive locking
    ///
    /// Writes to a temp file in the same directory, syncs it, then renames
    /// it over the original.
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "enrollment path missing parent")
        })?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::info!("Saved enrollment for {} to {:?}", self.name, path);
        Ok(())
    }
}

/// Normalize an Indian mobile number to `+91XXXXXXXXXX`
///
/// Whitespace is stripped; numbers without the `+91` prefix lose any
/// leading zeros and gain the prefix.
pub fn normalize_phone(raw: &str) -> Result<String> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    let normalized = if compact.starts_with(COUNTRY_PREFIX) {
        compact
    } else {
        format!("{}{}", COUNTRY_PREFIX, compact.trim_start_matches('0'))
    };

    let subscriber = &normalized[COUNTRY_PREFIX.len()..];
    if subscriber.len() != SUBSCRIBER_DIGITS || !subscriber.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::Validation(format!(
            "'{}' is not a valid 10-digit Indian phone number",
            raw.trim()
        )));
    }

    Ok(normalized)
}
