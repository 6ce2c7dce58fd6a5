use std::collections::HashMap;
use std::fs::DirBuilder;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::driver::{Capabilities, Scope, VolumeDriver, VolumeRecord, MOUNTPOINT_OPTION};
use crate::error::{MappingError, MappingResult};
use crate::state::StateFile;

const DIR_MODE: u32 = 0o700;

/// Volume name to host directory table, persisted to a JSON state file.
///
/// Every accessor goes through the same mutex. Mutations persist the whole
/// table while still holding it, so a slow disk serializes writers.
pub struct MappingStore {
    volumes: Mutex<HashMap<String, PathBuf>>,
    state: StateFile,
}

impl MappingStore {
    /// Open the store rooted at `state_dir`.
    ///
    /// Never fails: an unreadable or malformed state file leaves the store
    /// empty, and a missing state directory is created on a best-effort basis.
    pub fn open<P: AsRef<Path>>(state_dir: P) -> Self {
        let state_dir = state_dir.as_ref();
        tracing::debug!(state_dir = %state_dir.display(), "Driver init ...");

        if let Err(e) = DirBuilder::new().mode(DIR_MODE).create(state_dir) {
            if e.kind() != std::io::ErrorKind::AlreadyExists {
                tracing::warn!(
                    state_dir = %state_dir.display(),
                    "Could not create state directory: {}",
                    e
                );
            }
        }

        let state = StateFile::in_dir(state_dir);
        let volumes = match state.load() {
            Ok(volumes) => volumes,
            Err(e) if e.is_missing_file() => {
                tracing::debug!(state_file = %state.path().display(), "No state file, starting empty");
                HashMap::new()
            }
            Err(e) => {
                tracing::warn!("Ignoring unusable state, starting empty: {}", e);
                HashMap::new()
            }
        };

        tracing::debug!(volumes = ?volumes, "Init success, found {} volumes", volumes.len());
        Self {
            volumes: Mutex::new(volumes),
            state,
        }
    }

    pub fn state_path(&self) -> &Path {
        self.state.path()
    }

    // Critical sections never leave the table half-updated, so a panic in
    // another holder does not invalidate it.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, PathBuf>> {
        self.volumes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup(&self, name: &str) -> MappingResult<PathBuf> {
        self.lock()
            .get(name)
            .cloned()
            .ok_or_else(|| MappingError::NotFound(name.to_string()))
    }
}

fn mountpoint_option(options: &HashMap<String, String>) -> MappingResult<PathBuf> {
    let mountpoint = match options.get(MOUNTPOINT_OPTION) {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => {
            return Err(MappingError::InvalidArgument(format!(
                "The `{}` option is required",
                MOUNTPOINT_OPTION
            )))
        }
    };
    if !mountpoint.is_absolute() {
        return Err(MappingError::InvalidArgument(format!(
            "The `{}` option must be an absolute path, got {}",
            MOUNTPOINT_OPTION,
            mountpoint.display()
        )));
    }
    Ok(mountpoint)
}

fn log_error(err: MappingError) -> MappingError {
    tracing::error!("{}", err);
    err
}

impl VolumeDriver for MappingStore {
    fn create(&self, name: &str, options: &HashMap<String, String>) -> MappingResult<()> {
        tracing::debug!(volume = name, options = ?options, "Create called");

        if name.is_empty() {
            return Err(log_error(MappingError::InvalidArgument(
                "volume name must not be empty".to_string(),
            )));
        }
        let mountpoint = mountpoint_option(options).map_err(log_error)?;

        let mut volumes = self.lock();
        if volumes.contains_key(name) {
            return Err(log_error(MappingError::AlreadyExists(name.to_string())));
        }

        DirBuilder::new()
            .recursive(true)
            .mode(DIR_MODE)
            .create(&mountpoint)
            .map_err(|e| log_error(MappingError::io(&mountpoint, e)))?;

        volumes.insert(name.to_string(), mountpoint.clone());
        if let Err(e) = self.state.save(&volumes) {
            volumes.remove(name);
            return Err(log_error(e));
        }

        tracing::debug!(volume = name, mountpoint = %mountpoint.display(), "Create success");
        Ok(())
    }

    fn remove(&self, name: &str) -> MappingResult<()> {
        tracing::debug!(volume = name, "Remove called");

        let mut volumes = self.lock();
        let removed = volumes.remove(name);
        if let Err(e) = self.state.save(&volumes) {
            if let Some(mountpoint) = removed {
                volumes.insert(name.to_string(), mountpoint);
            }
            return Err(log_error(e));
        }

        tracing::debug!(volume = name, "Remove success");
        Ok(())
    }

    fn list(&self) -> MappingResult<Vec<VolumeRecord>> {
        tracing::debug!("List called");

        let volumes = self.lock();
        let records: Vec<VolumeRecord> = volumes
            .iter()
            .map(|(name, mountpoint)| VolumeRecord {
                name: name.clone(),
                mountpoint: mountpoint.clone(),
            })
            .collect();

        tracing::debug!("List success, found {} volumes", records.len());
        Ok(records)
    }

    fn get(&self, name: &str) -> MappingResult<VolumeRecord> {
        tracing::debug!(volume = name, "Get called");

        let mountpoint = self.lookup(name).map_err(log_error)?;
        tracing::debug!(volume = name, "Get success");
        Ok(VolumeRecord {
            name: name.to_string(),
            mountpoint,
        })
    }

    fn path(&self, name: &str) -> MappingResult<PathBuf> {
        tracing::debug!(volume = name, "Path called");

        let mountpoint = self.lookup(name).map_err(log_error)?;
        tracing::debug!(mountpoint = %mountpoint.display(), "Path success");
        Ok(mountpoint)
    }

    /// The directory already exists, so mounting only reports where it is.
    fn mount(&self, name: &str, id: &str) -> MappingResult<PathBuf> {
        tracing::debug!(volume = name, id, "Mount called");

        let mountpoint = self.lookup(name).map_err(log_error)?;
        tracing::debug!(mountpoint = %mountpoint.display(), "Mount success");
        Ok(mountpoint)
    }

    fn unmount(&self, name: &str, id: &str) -> MappingResult<()> {
        tracing::debug!(volume = name, id, "Unmount called");
        tracing::debug!(volume = name, "Unmount success");
        Ok(())
    }

    fn capabilities(&self) -> Capabilities {
        tracing::debug!("Capabilities called");
        Capabilities {
            scope: Scope::Local,
        }
    }
}
