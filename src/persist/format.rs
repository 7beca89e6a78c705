//! On-disk registry format.
//!
//! A single JSON object mapping subject id strings to a boolean grant flag:
//!
//! ```json
//! {
//!   "42": true,
//!   "7": true
//! }
//! ```
//!
//! Only `true` entries grant authorization. The plaintext and hashes of
//! challenges never appear here.

use crate::{GateError, SubjectId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Persisted grant map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistryRecord {
    /// Subject id to grant flag.
    pub grants: BTreeMap<String, bool>,
}

impl RegistryRecord {
    /// Build a record granting every subject in the set.
    pub fn from_subjects<'a>(subjects: impl IntoIterator<Item = &'a SubjectId>) -> Self {
        Self {
            grants: subjects
                .into_iter()
                .map(|s| (s.as_str().to_string(), true))
                .collect(),
        }
    }

    /// Subjects whose flag is `true`.
    pub fn authorized_subjects(&self) -> BTreeSet<SubjectId> {
        self.grants
            .iter()
            .filter(|(_, granted)| **granted)
            .map(|(id, _)| SubjectId::new(id.as_str()))
            .collect()
    }

    /// Serialize the record to pretty JSON.
    pub fn to_json(&self) -> Result<String, GateError> {
        serde_json::to_string_pretty(self).map_err(|e| {
            GateError::PersistenceFailure(format!("Failed to serialize registry: {}", e))
        })
    }

    /// Deserialize a record from JSON.
    pub fn from_json(json: &str) -> Result<Self, GateError> {
        serde_json::from_str(json)
            .map_err(|e| GateError::CorruptState(format!("Failed to parse registry: {}", e)))
    }
}
