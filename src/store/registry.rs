//! Durable set of authorized subjects.
//!
//! Membership only changes through `grant`, `revoke` and `clear_all`.
//! Loading never fails: a missing or corrupt store yields an empty set,
//! so a damaged file can only ever lock everyone out, never let anyone in.

use crate::persist::format::RegistryRecord;
use crate::persist::RegistryStore;
use crate::{GateError, SubjectId};
use std::collections::BTreeSet;

/// In-memory view of the persisted grants.
#[derive(Debug, Clone, Default)]
pub struct AuthorizedSubjectRegistry {
    subjects: BTreeSet<SubjectId>,
}

impl AuthorizedSubjectRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the registry from a store, degrading to empty on any failure.
    pub fn load(store: &dyn RegistryStore) -> Self {
        match store.load() {
            Ok(Some(record)) => {
                let subjects = record.authorized_subjects();
                tracing::info!(count = subjects.len(), "Loaded authorized subjects");
                Self { subjects }
            }
            Ok(None) => {
                tracing::debug!("No persisted registry, starting empty");
                Self::new()
            }
            Err(e @ GateError::CorruptState(_)) => {
                tracing::error!(error = %e, "Corrupt registry, resetting to empty");
                Self::new()
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load registry, starting empty");
                Self::new()
            }
        }
    }

    /// Persist the current grants.
    pub fn save(&self, store: &dyn RegistryStore) -> Result<(), GateError> {
        store.save(&self.to_record())
    }

    /// Whether the subject holds a grant.
    pub fn is_authorized(&self, subject: &SubjectId) -> bool {
        self.subjects.contains(subject)
    }

    /// Grant authorization. Returns `false` if it was already granted.
    pub fn grant(&mut self, subject: &SubjectId) -> bool {
        self.subjects.insert(subject.clone())
    }

    /// Revoke authorization. Returns `false` if there was nothing to revoke.
    pub fn revoke(&mut self, subject: &SubjectId) -> bool {
        self.subjects.remove(subject)
    }

    /// Remove every grant and return how many there were.
    pub fn clear_all(&mut self) -> usize {
        let count = self.subjects.len();
        self.subjects.clear();
        count
    }

    /// Number of authorized subjects.
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    /// Whether no subject is authorized.
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// Persistable snapshot of the grants.
    pub fn to_record(&self) -> RegistryRecord {
        RegistryRecord::from_subjects(self.subjects.iter())
    }
}
