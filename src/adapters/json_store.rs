use crate::domain::model::BirthdayRecord;
use crate::domain::ports::RecordStore;
use crate::utils::error::{ReminderError, Result};
use crate::utils::validation::Validate;
use std::fs;
use std::path::{Path, PathBuf};

/// Records kept as a pretty-printed JSON array on local disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<BirthdayRecord>> {
        // 檔案不存在視為空清單 (首次執行)
        if !self.path.exists() {
            tracing::debug!("Store file {} not found, starting empty", self.path.display());
            return Ok(Vec::new());
        }

        let data = fs::read(&self.path).map_err(|e| ReminderError::StoreUnavailable {
            message: format!("cannot read {}: {}", self.path.display(), e),
        })?;

        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&data).map_err(|e| ReminderError::StoreUnavailable {
            message: format!("{} is not a valid record list: {}", self.path.display(), e),
        })
    }

    fn save(&self, records: &[BirthdayRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // 先寫入暫存檔再改名，讀取端不會看到寫到一半的檔案
        let json = serde_json::to_string_pretty(records)?;
        let staging = self.staging_path();
        fs::write(&staging, json)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Validates and stores a new record, returning it with its assigned id.
    pub fn add_record(&self, mut record: BirthdayRecord) -> Result<BirthdayRecord> {
        record.validate()?;

        let mut records = self.load()?;
        record.id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        records.push(record.clone());
        self.save(&records)?;

        tracing::info!("➕ Added {} ({}) as #{}", record.name, record.email, record.id);
        Ok(record)
    }

    /// Returns whether a record with `id` existed.
    pub fn remove_record(&self, id: u64) -> Result<bool> {
        let mut records = self.load()?;
        let before = records.len();
        records.retain(|r| r.id != id);

        if records.len() == before {
            return Ok(false);
        }

        self.save(&records)?;
        tracing::info!("🗑️ Removed record #{}", id);
        Ok(true)
    }
}

impl RecordStore for JsonFileStore {
    async fn list_all_records(&self) -> Result<Vec<BirthdayRecord>> {
        self.load()
    }
}
