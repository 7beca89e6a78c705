//! Persistence for the authorized-subject registry.
//!
//! The registry is injected with a [`RegistryStore`] so the gate can run
//! against the on-disk [`file::FileStore`] in production and the in-process
//! [`memory::MemoryStore`] in tests.

pub mod file;
pub mod format;
pub mod memory;

use crate::persist::format::RegistryRecord;
use crate::GateError;

/// Backend that loads and saves the persisted grant map.
pub trait RegistryStore: Send + Sync {
    /// Load the persisted record.
    ///
    /// # Returns
    /// * `Ok(None)` - Nothing has been persisted yet
    /// * `Err(CorruptState)` - Data exists but cannot be parsed
    /// * `Err(PersistenceFailure)` - Data could not be read
    fn load(&self) -> Result<Option<RegistryRecord>, GateError>;

    /// Replace the persisted record atomically.
    fn save(&self, record: &RegistryRecord) -> Result<(), GateError>;
}
