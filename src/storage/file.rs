//! File-based review storage.
//!
//! Records are stored per user as a JSON array in
//! `~/.flashdeck/reviews/user-<id>.json`. Writes go through a temp file and
//! rename; a process-local lock serialises read-modify-write cycles.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::config::reviews_dir;
use crate::core::ReviewRecord;
use crate::error::{FlashdeckError, Result};
use crate::storage::ReviewStore;

const USER_FILE_PREFIX: &str = "user-";

/// File-based review storage.
#[derive(Debug)]
pub struct FileReviewStore {
    /// Directory where per-user files are stored.
    reviews_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileReviewStore {
    /// Create a store in the default directory.
    ///
    /// Uses `~/.flashdeck/reviews/` or `$FLASHDECK_HOME/reviews/`.
    pub fn new() -> Result<Self> {
        let dir = reviews_dir().ok_or_else(|| {
            FlashdeckError::config("Could not determine reviews directory (no home directory)")
        })?;
        Self::with_dir(dir)
    }

    /// Create a store in a custom directory, creating it if needed.
    pub fn with_dir(reviews_dir: impl Into<PathBuf>) -> Result<Self> {
        let reviews_dir = reviews_dir.into();

        if !reviews_dir.exists() {
            fs::create_dir_all(&reviews_dir).map_err(|e| FlashdeckError::storage(&reviews_dir, e))?;
        }

        Ok(Self {
            reviews_dir,
            write_lock: Mutex::new(()),
        })
    }

    /// The directory holding the user files.
    pub fn dir(&self) -> &Path {
        &self.reviews_dir
    }

    fn user_path(&self, user_id: i64) -> PathBuf {
        self.reviews_dir
            .join(format!("{}{}.json", USER_FILE_PREFIX, user_id))
    }

    fn temp_path(&self, user_id: i64) -> PathBuf {
        self.reviews_dir
            .join(format!(".{}{}.json.tmp", USER_FILE_PREFIX, user_id))
    }

    fn read_user(&self, user_id: i64) -> Result<Vec<ReviewRecord>> {
        let path = self.user_path(user_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path).map_err(|e| FlashdeckError::storage(&path, e))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write a user's records atomically using temp file + rename.
    fn write_user(&self, user_id: i64, records: &[ReviewRecord]) -> Result<()> {
        let final_path = self.user_path(user_id);
        let temp_path = self.temp_path(user_id);

        if records.is_empty() {
            if final_path.exists() {
                fs::remove_file(&final_path).map_err(|e| FlashdeckError::storage(&final_path, e))?;
            }
            return Ok(());
        }

        let json = serde_json::to_string_pretty(records)?;

        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| FlashdeckError::storage(&temp_path, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| FlashdeckError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| FlashdeckError::storage(&temp_path, e))?;
        }

        fs::rename(&temp_path, &final_path).map_err(|e| FlashdeckError::storage(&final_path, e))?;

        Ok(())
    }

    /// User ids with a records file, skipping temp and unrelated files.
    fn user_ids(&self) -> Result<Vec<i64>> {
        let entries = fs::read_dir(&self.reviews_dir)
            .map_err(|e| FlashdeckError::storage(&self.reviews_dir, e))?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FlashdeckError::storage(&self.reviews_dir, e))?;
            let name = entry.file_name();
            let Some(id) = name
                .to_str()
                .and_then(|n| n.strip_prefix(USER_FILE_PREFIX))
                .and_then(|n| n.strip_suffix(".json"))
                .and_then(|n| n.parse::<i64>().ok())
            else {
                continue;
            };
            ids.push(id);
        }
        ids.sort_unstable();
        Ok(ids)
    }
}

impl ReviewStore for FileReviewStore {
    fn get(&self, card_id: i64, user_id: i64) -> Result<Option<ReviewRecord>> {
        Ok(self
            .read_user(user_id)?
            .into_iter()
            .find(|r| r.card_id == card_id))
    }

    fn upsert(&self, record: &ReviewRecord) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut records = self.read_user(record.user_id)?;
        match records.iter_mut().find(|r| r.card_id == record.card_id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        records.sort_by_key(|r| r.card_id);

        self.write_user(record.user_id, &records)
    }

    fn list_for_user(&self, user_id: i64) -> Result<Vec<ReviewRecord>> {
        let mut records = self.read_user(user_id)?;
        records.sort_by_key(|r| r.card_id);
        Ok(records)
    }

    fn delete_card(&self, card_id: i64) -> Result<usize> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut removed = 0;
        for user_id in self.user_ids()? {
            let mut records = self.read_user(user_id)?;
            let before = records.len();
            records.retain(|r| r.card_id != card_id);
            if records.len() != before {
                removed += before - records.len();
                self.write_user(user_id, &records)?;
            }
        }

        Ok(removed)
    }
}
