//! File-based registry store with atomic writes.
//!
//! Stores the grant map as `authorized_subjects.json` under the data
//! directory. Uses temp file + rename in the same directory for atomic
//! writes, so an interrupted save leaves the previous file intact.

use crate::persist::format::RegistryRecord;
use crate::persist::RegistryStore;
use crate::GateError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "PRESENCE_GATE_DATA_DIR";

/// File name of the persisted registry.
pub const REGISTRY_FILE_NAME: &str = "authorized_subjects.json";

/// File-based registry store.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Path of the registry file.
    path: PathBuf,
}

impl FileStore {
    /// Create a store for the given namespace.
    ///
    /// The directory is `$PRESENCE_GATE_DATA_DIR` if set, otherwise
    /// `dirs::config_dir()/<namespace>/`. It is created if missing.
    pub fn new(namespace: &str) -> Result<Self, GateError> {
        let override_dir = std::env::var_os(DATA_DIR_ENV).map(PathBuf::from);
        let dir = resolve_data_dir(namespace, override_dir)?;

        fs::create_dir_all(&dir).map_err(|e| {
            GateError::PersistenceFailure(format!("Failed to create data dir: {}", e))
        })?;

        Ok(Self {
            path: dir.join(REGISTRY_FILE_NAME),
        })
    }

    /// Create a store backed by an explicit file path.
    ///
    /// The parent directory is created on first save.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the registry file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Temp path next to the target, so the rename stays on one filesystem.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| REGISTRY_FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl RegistryStore for FileStore {
    fn load(&self) -> Result<Option<RegistryRecord>, GateError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&self.path).map_err(|e| {
            GateError::PersistenceFailure(format!("Failed to read registry file: {}", e))
        })?;
        let json = String::from_utf8(bytes).map_err(|e| {
            GateError::CorruptState(format!("Registry file is not UTF-8: {}", e))
        })?;

        let record = RegistryRecord::from_json(&json)?;
        Ok(Some(record))
    }

    fn save(&self, record: &RegistryRecord) -> Result<(), GateError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                GateError::PersistenceFailure(format!("Failed to create dir: {}", e))
            })?;
        }

        let json = record.to_json()?;
        let temp_path = self.temp_path();

        // Write and flush the temp file
        let mut file = fs::File::create(&temp_path).map_err(|e| {
            GateError::PersistenceFailure(format!("Failed to create temp file: {}", e))
        })?;
        file.write_all(json.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| {
                GateError::PersistenceFailure(format!("Failed to write temp file: {}", e))
            })?;
        drop(file);

        // Atomic rename
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(GateError::PersistenceFailure(format!(
                "Failed to replace registry file: {}",
                e
            )));
        }

        Ok(())
    }
}

/// Pick the data directory: explicit override first, then the platform
/// config directory joined with `namespace`.
pub fn resolve_data_dir(
    namespace: &str,
    override_dir: Option<PathBuf>,
) -> Result<PathBuf, GateError> {
    if let Some(dir) = override_dir.filter(|d| !d.as_os_str().is_empty()) {
        return Ok(dir);
    }

    if namespace.is_empty() {
        return Err(GateError::ConfigError(
            "namespace cannot be empty".to_string(),
        ));
    }

    let base_dir = dirs::config_dir().ok_or_else(|| {
        GateError::ConfigError("Could not find config directory".to_string())
    })?;

    Ok(base_dir.join(namespace))
}
