//! Capacity-limited packet log with JSON export/import.

use std::fs;
use std::path::Path;

use thiserror::Error;

use netpulse_core::PacketRecord;

use crate::record::StoredPacketRecord;

/// Packet store failure conditions.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The log is at capacity; the write was rejected and the contents
    /// are unchanged.
    #[error("Packet store capacity {capacity} reached")]
    CapacityExceeded { capacity: usize },

    #[error("Index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A persisted log did not match the expected JSON array shape.
    #[error("Invalid packet log format: {0}")]
    FormatInvalid(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Append-mostly ordered log of [`StoredPacketRecord`] with an optional
/// capacity. Once full, writes are rejected; nothing is evicted.
///
/// Not internally synchronized. Concurrent callers go through
/// [`crate::SharedPacketStore`].
#[derive(Debug)]
pub struct PacketStore {
    records: Vec<StoredPacketRecord>,
    capacity: Option<usize>,
}

impl PacketStore {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            records: Vec::new(),
            capacity,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Convert a live packet to its storage projection and append it.
    pub fn ingest(&mut self, record: &PacketRecord) -> Result<(), StoreError> {
        self.push(StoredPacketRecord::from(record))
    }

    /// Append one record, rejecting the write when at capacity.
    pub fn push(&mut self, record: StoredPacketRecord) -> Result<(), StoreError> {
        self.check_capacity()?;
        self.records.push(record);
        Ok(())
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Change the capacity. Shrinking below the current length truncates
    /// to the first `capacity` records, keeping the oldest.
    pub fn set_capacity(&mut self, capacity: Option<usize>) {
        self.capacity = capacity;
        if let Some(capacity) = capacity {
            if self.records.len() > capacity {
                self.records.truncate(capacity);
            }
        }
    }

    pub fn get(&self, index: usize) -> Option<&StoredPacketRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[StoredPacketRecord] {
        &self.records
    }

    /// Overwrite the record at `index`.
    pub fn replace(
        &mut self,
        index: usize,
        record: StoredPacketRecord,
    ) -> Result<(), StoreError> {
        match self.records.get_mut(index) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(self.out_of_bounds(index)),
        }
    }

    /// Remove and return the record at `index`, shifting later records.
    pub fn remove(&mut self, index: usize) -> Result<StoredPacketRecord, StoreError> {
        if index >= self.records.len() {
            return Err(self.out_of_bounds(index));
        }
        Ok(self.records.remove(index))
    }

    /// Insert a record at `index`, shifting later records. Subject to
    /// the same capacity check as [`push`](Self::push).
    pub fn insert(&mut self, index: usize, record: StoredPacketRecord) -> Result<(), StoreError> {
        self.check_capacity()?;
        if index > self.records.len() {
            return Err(self.out_of_bounds(index));
        }
        self.records.insert(index, record);
        Ok(())
    }

    /// Drop every record. Exported files are unaffected.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StoredPacketRecord> {
        self.records.iter()
    }

    /// Serialize the full log to `path` as a pretty-printed JSON array.
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.records)
            .map_err(|e| StoreError::FormatInvalid(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Rehydrate a log from a file written by [`export`](Self::export).
    ///
    /// The file must contain a top-level JSON array; anything else fails
    /// with [`StoreError::FormatInvalid`]. Loading stops early once
    /// `capacity` records have been read.
    pub fn load_from<P: AsRef<Path>>(path: P, capacity: Option<usize>) -> Result<Self, StoreError> {
        let text = fs::read_to_string(path)?;
        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| StoreError::FormatInvalid(e.to_string()))?;
        let items = match value {
            serde_json::Value::Array(items) => items,
            other => {
                return Err(StoreError::FormatInvalid(format!(
                    "expected a top-level array, found {}",
                    json_kind(&other)
                )))
            }
        };

        let mut store = Self::new(capacity);
        for item in items {
            if store.at_capacity() {
                break;
            }
            let record: StoredPacketRecord = serde_json::from_value(item)
                .map_err(|e| StoreError::FormatInvalid(e.to_string()))?;
            store.records.push(record);
        }
        Ok(store)
    }

    fn at_capacity(&self) -> bool {
        self.capacity
            .is_some_and(|capacity| self.records.len() >= capacity)
    }

    fn check_capacity(&self) -> Result<(), StoreError> {
        match self.capacity {
            Some(capacity) if self.records.len() >= capacity => {
                Err(StoreError::CapacityExceeded { capacity })
            }
            _ => Ok(()),
        }
    }

    fn out_of_bounds(&self, index: usize) -> StoreError {
        StoreError::IndexOutOfBounds {
            index,
            len: self.records.len(),
        }
    }
}

impl<'a> IntoIterator for &'a PacketStore {
    type Item = &'a StoredPacketRecord;
    type IntoIter = std::slice::Iter<'a, StoredPacketRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(index: u32) -> StoredPacketRecord {
        StoredPacketRecord {
            timestamp: 1000.0 + f64::from(index),
            captured_length: 100 + index,
            highest_layer: "TCP".into(),
            summary: format!("packet {}", index),
            src_ip: Some("10.0.0.1".parse().unwrap()),
            dst_ip: Some("10.0.0.2".parse().unwrap()),
            src_port: Some(443),
            dst_port: Some(50000 + index as u16),
        }
    }

    fn filled(n: u32, capacity: Option<usize>) -> PacketStore {
        let mut store = PacketStore::new(capacity);
        for i in 0..n {
            store.push(stored(i)).unwrap();
        }
        store
    }

    #[test]
    fn rejects_pushes_beyond_capacity() {
        let mut store = filled(2, Some(2));
        let err = store.push(stored(9)).unwrap_err();
        assert!(matches!(err, StoreError::CapacityExceeded { capacity: 2 }));
        // Contents unchanged.
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).unwrap().summary, "packet 1");
    }

    #[test]
    fn shrinking_capacity_keeps_oldest_records() {
        let mut store = filled(5, None);
        store.set_capacity(Some(3));
        assert_eq!(store.len(), 3);
        let summaries: Vec<&str> = store.iter().map(|r| r.summary.as_str()).collect();
        assert_eq!(summaries, vec!["packet 0", "packet 1", "packet 2"]);

        // Back to unbounded: appends work again.
        store.set_capacity(None);
        store.push(stored(9)).unwrap();
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn ingest_applies_packet_defaults() {
        let mut store = PacketStore::unbounded();
        store.ingest(&PacketRecord::default()).unwrap();
        let record = store.get(0).unwrap();
        assert_eq!(record.captured_length, 0);
        assert_eq!(record.highest_layer, "UNKNOWN");
    }

    #[test]
    fn replace_remove_insert_respect_bounds() {
        let mut store = filled(3, Some(4));

        store.replace(1, stored(7)).unwrap();
        assert_eq!(store.get(1).unwrap().summary, "packet 7");
        assert!(matches!(
            store.replace(3, stored(8)),
            Err(StoreError::IndexOutOfBounds { index: 3, len: 3 })
        ));

        let removed = store.remove(0).unwrap();
        assert_eq!(removed.summary, "packet 0");
        assert_eq!(store.len(), 2);

        store.insert(0, stored(5)).unwrap();
        assert_eq!(store.get(0).unwrap().summary, "packet 5");
        assert!(matches!(
            store.insert(9, stored(6)),
            Err(StoreError::IndexOutOfBounds { .. })
        ));

        // Store is back at 3 of 4; one more fills it, then inserts fail.
        store.insert(0, stored(6)).unwrap();
        assert!(matches!(
            store.insert(0, stored(7)),
            Err(StoreError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn export_import_roundtrip() {
        let dir = tempfile::tempdir().unwrap();

        // Empty, partially filled, and unbounded with unresolved fields.
        let empty = PacketStore::new(Some(4));
        let partial = filled(2, Some(4));
        let mut unbounded = filled(3, None);
        unbounded
            .push(StoredPacketRecord {
                timestamp: 0.0,
                captured_length: 0,
                highest_layer: "UNKNOWN".into(),
                summary: String::new(),
                src_ip: None,
                dst_ip: None,
                src_port: None,
                dst_port: None,
            })
            .unwrap();

        for (name, store) in [("empty", &empty), ("partial", &partial), ("full", &unbounded)] {
            let path = dir.path().join(format!("{}.json", name));
            store.export(&path).unwrap();
            let loaded = PacketStore::load_from(&path, None).unwrap();
            assert_eq!(loaded.records(), store.records());
        }
    }

    #[test]
    fn clear_does_not_touch_exported_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        let mut store = filled(3, None);
        store.export(&path).unwrap();

        store.clear();
        assert!(store.is_empty());

        let reloaded = PacketStore::load_from(&path, None).unwrap();
        assert_eq!(reloaded.len(), 3);
    }

    #[test]
    fn load_stops_early_at_capacity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        filled(5, None).export(&path).unwrap();

        let loaded = PacketStore::load_from(&path, Some(2)).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get(0).unwrap().summary, "packet 0");
    }

    #[test]
    fn load_rejects_non_array_top_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"records": []}"#).unwrap();

        let err = PacketStore::load_from(&path, None).unwrap_err();
        match err {
            StoreError::FormatInvalid(message) => {
                assert!(message.contains("top-level array"));
            }
            other => panic!("expected FormatInvalid, got {:?}", other),
        }
    }

    #[test]
    fn load_rejects_malformed_elements() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"[{"timestamp": "not a number"}]"#).unwrap();

        assert!(matches!(
            PacketStore::load_from(&path, None),
            Err(StoreError::FormatInvalid(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            PacketStore::load_from("does/not/exist.json", None),
            Err(StoreError::Io(_))
        ));
    }
}
