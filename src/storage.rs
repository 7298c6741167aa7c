//! Storage layer for dayplan
//!
//! Everything lives under one data directory (current directory by default).
//!
//! # Directory Structure
//!
//! ```text
//! <data dir>/
//!   .dayplan.toml               # Configuration
//!   .dayplan/
//!     session.json              # Active login, if any
//!   data_<id>_<password>.json   # Per-user layout: all days of one identity
//!   <YYYY-MM-DD>.json           # Per-day layout: one file per calendar date
//! ```
//!
//! Reads degrade to an empty document according to [`ReadFallback`]; writes
//! are atomic (temp file + rename). There is no locking: the last writer wins.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

/// Name of the directory holding local state
pub const LOCAL_DIR: &str = ".dayplan";

/// What to do when a document exists but cannot be read or parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadFallback {
    /// Treat the document as empty and carry on
    #[default]
    Empty,
    /// Propagate the error
    Strict,
}

/// Storage manager for dayplan state
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
    fallback: ReadFallback,
}

impl Storage {
    /// Create a storage manager rooted at `root`
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            fallback: ReadFallback::default(),
        }
    }

    pub fn with_fallback(mut self, fallback: ReadFallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fallback(&self) -> ReadFallback {
        self.fallback
    }

    // =========================================================================
    // Path accessors
    // =========================================================================

    /// Path to the data directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the local `.dayplan/` directory
    pub fn local_dir(&self) -> PathBuf {
        self.root.join(LOCAL_DIR)
    }

    /// Path to the persisted session
    pub fn session_file(&self) -> PathBuf {
        self.local_dir().join("session.json")
    }

    /// Path to the document of one identity key
    pub fn user_file(&self, key: &str) -> PathBuf {
        self.root.join(format!("data_{key}.json"))
    }

    /// Path to the document of one calendar date
    pub fn day_file(&self, date: NaiveDate) -> PathBuf {
        self.root.join(format!("{}.json", date.format("%Y-%m-%d")))
    }

    // =========================================================================
    // Document I/O
    // =========================================================================

    /// Load a document, yielding the empty (default) one when the file is
    /// missing or, under [`ReadFallback::Empty`], unreadable.
    pub fn load<T: DeserializeOwned + Default>(&self, path: &Path) -> Result<T> {
        if !path.exists() {
            return Ok(T::default());
        }

        match self.read_json(path) {
            Ok(doc) => Ok(doc),
            Err(err) => match self.fallback {
                ReadFallback::Empty => {
                    tracing::debug!(path = %path.display(), error = %err, "unreadable document treated as empty");
                    Ok(T::default())
                }
                ReadFallback::Strict => Err(err),
            },
        }
    }

    /// Save a document as pretty-printed UTF-8 JSON, replacing the file.
    pub fn save<T: Serialize>(&self, path: &Path, doc: &T) -> Result<()> {
        self.write_json(path, doc)?;
        tracing::trace!(path = %path.display(), "document saved");
        Ok(())
    }

    /// Delete a document if it exists; returns whether a file was removed.
    pub fn remove(&self, path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        tracing::trace!(path = %path.display(), "document removed");
        Ok(true)
    }

    /// Dates that have a per-day document, ascending
    pub fn day_file_dates(&self) -> Result<Vec<NaiveDate>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut dates = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Some(stem) = name.strip_suffix(".json") else {
                continue;
            };
            if let Ok(date) = NaiveDate::parse_from_str(stem, "%Y-%m-%d") {
                if entry.path().is_file() {
                    dates.push(date);
                }
            }
        }
        dates.sort();
        Ok(dates)
    }

    // =========================================================================
    // File I/O helpers (atomic writes for safety)
    // =========================================================================

    /// Write JSON data atomically (write to temp, then rename)
    pub fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        self.write_atomic(path, json.as_bytes())
    }

    /// Read JSON data from a file
    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        let data: T = serde_json::from_str(&content)?;
        Ok(data)
    }

    /// Write data atomically using temp file + rename
    ///
    /// Readers never see a partially written document.
    pub fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");

        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;

        fs::rename(&temp_path, path)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    use crate::day::{DayRecord, UserDocument};
    use crate::slot::TimeSlot;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_storage_paths() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().to_path_buf();
        let storage = Storage::new(root.clone());

        assert_eq!(storage.local_dir(), root.join(".dayplan"));
        assert_eq!(storage.session_file(), root.join(".dayplan/session.json"));
        assert_eq!(storage.user_file("kim_pw"), root.join("data_kim_pw.json"));
        assert_eq!(storage.day_file(date(2024, 3, 9)), root.join("2024-03-09.json"));
    }

    #[test]
    fn missing_file_loads_empty() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().to_path_buf()).with_fallback(ReadFallback::Strict);

        let doc: UserDocument = storage.load(&storage.user_file("nobody_x")).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn corrupt_file_follows_fallback_policy() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().to_path_buf());
        let path = storage.user_file("kim_pw");
        fs::write(&path, "{ not json").unwrap();

        let doc: UserDocument = storage.load(&path).unwrap();
        assert!(doc.is_empty());

        let strict = storage.clone().with_fallback(ReadFallback::Strict);
        let err = strict.load::<UserDocument>(&path).unwrap_err();
        assert!(matches!(err, crate::error::Error::Json(_)));
    }

    #[test]
    fn save_then_load_round_trips() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().to_path_buf());
        let path = storage.user_file("kim_pw");

        let mut doc = UserDocument::default();
        let day = doc.day_mut(date(2024, 3, 9));
        day.set_text(TimeSlot::parse("09:00").unwrap(), "회의 준비");
        day.set_done(TimeSlot::parse("09:00").unwrap(), true);
        doc.day_mut(date(2024, 3, 10));

        storage.save(&path, &doc).unwrap();
        let back: UserDocument = storage.load(&path).unwrap();
        assert_eq!(back, doc);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("회의 준비"), "non-ASCII must stay unescaped");
        assert!(raw.contains("\n  "), "document is pretty-printed");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn remove_reports_presence() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().to_path_buf());
        let path = storage.day_file(date(2024, 1, 1));

        assert!(!storage.remove(&path).unwrap());
        storage.save(&path, &BTreeMap::<String, String>::new()).unwrap();
        assert!(storage.remove(&path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn day_file_dates_ignores_other_files() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().to_path_buf());

        storage.save(&storage.day_file(date(2024, 2, 1)), &DayRecord::default()).unwrap();
        storage.save(&storage.day_file(date(2024, 1, 31)), &DayRecord::default()).unwrap();
        storage.save(&storage.user_file("kim_pw"), &UserDocument::default()).unwrap();
        fs::write(temp.path().join("notes.json"), "{}").unwrap();

        assert_eq!(
            storage.day_file_dates().unwrap(),
            vec![date(2024, 1, 31), date(2024, 2, 1)]
        );
    }
}
