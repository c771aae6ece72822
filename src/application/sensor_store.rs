// In-memory sensor store
use crate::domain::sensor::{SensorName, SensorRecord, SensorUpdate, SensorValue};
use chrono::NaiveDateTime;
use tokio::sync::RwLock;

/// Holds exactly one record per [`SensorName`], in fixed order.
///
/// Records are overwritten in place and never removed. Multi-record
/// updates happen under a single write lock so readers never see a
/// half-applied cycle.
#[derive(Debug)]
pub struct SensorStore {
    records: RwLock<Vec<SensorRecord>>,
}

impl Default for SensorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Self::initial_records()),
        }
    }

    fn initial_records() -> Vec<SensorRecord> {
        SensorName::ALL.into_iter().map(SensorRecord::initial).collect()
    }

    pub async fn get_all(&self) -> Vec<SensorRecord> {
        self.records.read().await.clone()
    }

    pub async fn get(&self, name: SensorName) -> SensorRecord {
        self.records.read().await[name.index()].clone()
    }

    pub async fn replace(
        &self,
        name: SensorName,
        value: SensorValue,
        timestamp: Option<NaiveDateTime>,
    ) {
        let mut records = self.records.write().await;
        Self::overwrite(&mut records[name.index()], value, timestamp);
    }

    /// Apply several updates atomically
    pub async fn replace_all<I>(&self, updates: I)
    where
        I: IntoIterator<Item = SensorUpdate>,
    {
        let mut records = self.records.write().await;
        for update in updates {
            Self::overwrite(&mut records[update.name.index()], update.value, update.timestamp);
        }
    }

    /// Restore the zero/empty sentinels
    pub async fn reset(&self) {
        *self.records.write().await = Self::initial_records();
    }

    fn overwrite(record: &mut SensorRecord, value: SensorValue, timestamp: Option<NaiveDateTime>) {
        record.value = value;
        record.timestamp = timestamp;
    }
}
