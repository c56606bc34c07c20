use crate::domain::model::BirthdayRecord;
use crate::domain::ports::RecordStore;
use crate::utils::error::Result;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-process store. Each listing is a snapshot, so writers never disturb
/// a scan in progress.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<Vec<BirthdayRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<BirthdayRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    pub async fn insert(&self, record: BirthdayRecord) {
        self.records.write().await.push(record);
    }
}

impl RecordStore for MemoryStore {
    async fn list_all_records(&self) -> Result<Vec<BirthdayRecord>> {
        Ok(self.records.read().await.clone())
    }
}
