use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::MappingResult;

pub const DRIVER_NAME: &str = "local-mapping";

/// Create option naming the host directory a volume is bound to.
pub const MOUNTPOINT_OPTION: &str = "mountpoint";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeRecord {
    pub name: String,
    pub mountpoint: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Local,
    Global,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub scope: Scope,
}

/// Operations a volume plugin exposes to the container daemon.
pub trait VolumeDriver: Send + Sync {
    fn create(&self, name: &str, options: &HashMap<String, String>) -> MappingResult<()>;
    fn remove(&self, name: &str) -> MappingResult<()>;
    fn list(&self) -> MappingResult<Vec<VolumeRecord>>;
    fn get(&self, name: &str) -> MappingResult<VolumeRecord>;
    fn path(&self, name: &str) -> MappingResult<PathBuf>;
    fn mount(&self, name: &str, id: &str) -> MappingResult<PathBuf>;
    fn unmount(&self, name: &str, id: &str) -> MappingResult<()>;
    fn capabilities(&self) -> Capabilities;
}
