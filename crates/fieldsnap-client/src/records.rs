//! Ordered, append-only record set for the current session.

use fieldsnap_shared::types::CaptureRecord;

/// Insertion order is display order; records are never reordered,
/// deduplicated, mutated or removed while the session lives.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<CaptureRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: CaptureRecord) {
        tracing::debug!(id = %record.id, "Appended capture record");
        self.records.push(record);
    }

    /// Read view over every record, oldest first. Iteration is
    /// restartable and finite.
    pub fn all(&self) -> &[CaptureRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
