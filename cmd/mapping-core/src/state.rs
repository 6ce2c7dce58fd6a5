use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use crate::error::{MappingError, MappingResult};

pub const STATE_FILE_NAME: &str = "local-mapping.json";

const STATE_FILE_MODE: u32 = 0o600;

/// On-disk layout of the state file: `{"state": {"<name>": "<mountpoint>"}}`.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    #[serde(default)]
    pub state: HashMap<String, PathBuf>,
}

#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn in_dir<P: AsRef<Path>>(state_dir: P) -> Self {
        Self {
            path: state_dir.as_ref().join(STATE_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> MappingResult<HashMap<String, PathBuf>> {
        let data = fs::read(&self.path).map_err(|e| MappingError::io(&self.path, e))?;
        let saved: SavedState =
            serde_json::from_slice(&data).map_err(|source| MappingError::StateFormat {
                path: self.path.clone(),
                source,
            })?;
        Ok(saved.state)
    }

    /// Replace the state file with `volumes`.
    ///
    /// The JSON goes to a sibling temp file which is synced and then renamed
    /// over the state file, so readers only ever see a complete snapshot.
    pub fn save(&self, volumes: &HashMap<String, PathBuf>) -> MappingResult<()> {
        let saved = SavedState {
            state: volumes.clone(),
        };
        let data = serde_json::to_vec(&saved).map_err(|source| MappingError::StateFormat {
            path: self.path.clone(),
            source,
        })?;

        let tmp = self.tmp_path();
        if let Err(e) = write_synced(&tmp, &data) {
            let _ = fs::remove_file(&tmp);
            return Err(MappingError::io(&tmp, e));
        }
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(MappingError::io(&self.path, e));
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(STATE_FILE_MODE)
        .open(path)?;
    file.write_all(data)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn sample() -> HashMap<String, PathBuf> {
        HashMap::from([
            ("web".to_string(), PathBuf::from("/srv/web")),
            ("db".to_string(), PathBuf::from("/srv/db")),
        ])
    }

    #[test]
    fn save_then_load_reproduces_mapping() {
        let dir = TempDir::new().unwrap();
        let state = StateFile::in_dir(dir.path());

        state.save(&sample()).unwrap();
        assert_eq!(state.load().unwrap(), sample());
    }

    #[test]
    fn file_uses_state_envelope() {
        let dir = TempDir::new().unwrap();
        let state = StateFile::in_dir(dir.path());
        state.save(&sample()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&fs::read(state.path()).unwrap()).unwrap();
        let object = raw.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(raw["state"]["web"], "/srv/web");
        assert_eq!(raw["state"]["db"], "/srv/db");
    }

    #[test]
    fn file_is_owner_only_and_temp_is_gone() {
        let dir = TempDir::new().unwrap();
        let state = StateFile::in_dir(dir.path());
        state.save(&sample()).unwrap();

        let mode = fs::metadata(state.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!state.tmp_path().exists());
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let state = StateFile::in_dir(dir.path());
        state.save(&sample()).unwrap();
        state.save(&HashMap::new()).unwrap();

        assert!(state.load().unwrap().is_empty());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = StateFile::in_dir(dir.path()).load().unwrap_err();
        assert!(err.is_missing_file());
    }

    #[test]
    fn load_malformed_file_is_format_error() {
        let dir = TempDir::new().unwrap();
        let state = StateFile::in_dir(dir.path());
        fs::write(state.path(), b"{\"state\": [1, 2").unwrap();

        let err = state.load().unwrap_err();
        assert!(matches!(err, MappingError::StateFormat { .. }));
    }

    #[test]
    fn load_without_state_key_is_empty() {
        let dir = TempDir::new().unwrap();
        let state = StateFile::in_dir(dir.path());
        fs::write(state.path(), b"{}").unwrap();

        assert!(state.load().unwrap().is_empty());
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let state = StateFile::in_dir(dir.path().join("absent"));

        let err = state.save(&sample()).unwrap_err();
        assert!(matches!(err, MappingError::Io { .. }));
    }
}
