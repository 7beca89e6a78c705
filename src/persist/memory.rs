//! In-process registry store.

use crate::persist::format::RegistryRecord;
use crate::persist::RegistryStore;
use crate::GateError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Registry store that keeps the record in memory.
///
/// Saves can be made to fail on demand to exercise the gate's
/// non-fatal persistence path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<Option<RegistryRecord>>,
    corrupt: AtomicBool,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store (nothing persisted yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a record.
    pub fn with_record(record: RegistryRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
            ..Self::default()
        }
    }

    /// Create a store whose persisted data reads back as corrupt.
    pub fn corrupt() -> Self {
        let store = Self::default();
        store.corrupt.store(true, Ordering::SeqCst);
        store
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// The last successfully saved record.
    pub fn snapshot(&self) -> Option<RegistryRecord> {
        self.record
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl RegistryStore for MemoryStore {
    fn load(&self) -> Result<Option<RegistryRecord>, GateError> {
        if self.corrupt.load(Ordering::SeqCst) {
            return Err(GateError::CorruptState(
                "Injected corrupt registry".to_string(),
            ));
        }
        Ok(self.snapshot())
    }

    fn save(&self, record: &RegistryRecord) -> Result<(), GateError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(GateError::PersistenceFailure(
                "Injected save failure".to_string(),
            ));
        }
        *self.record.lock().unwrap_or_else(|e| e.into_inner()) = Some(record.clone());
        self.corrupt.store(false, Ordering::SeqCst);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SubjectId;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());

        let subjects = [SubjectId::from("1")];
        let record = RegistryRecord::from_subjects(subjects.iter());
        store.save(&record).unwrap();

        assert_eq!(store.load().unwrap(), Some(record));
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn test_memory_store_failing_saves() {
        let store = MemoryStore::new();
        store.set_fail_saves(true);
        let result = store.save(&RegistryRecord::default());
        assert!(matches!(result, Err(GateError::PersistenceFailure(_))));
        assert_eq!(store.save_count(), 0);
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn test_memory_store_corrupt_until_saved() {
        let store = MemoryStore::corrupt();
        assert!(matches!(store.load(), Err(GateError::CorruptState(_))));

        store.save(&RegistryRecord::default()).unwrap();
        assert!(store.load().unwrap().is_some());
    }
}
