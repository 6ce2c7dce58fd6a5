//! Wire types of the docker volume plugin API (v1.2).
//!
//! Every call is an HTTP POST whose JSON body and reply use PascalCase keys.
//! Failed calls reply with [`ErrResponse`] instead of the success body.

use mapping_core::{Capabilities, VolumeRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

pub const CONTENT_TYPE: &str = "application/vnd.docker.plugins.v1.2+json";

pub const ACTIVATE: &str = "/Plugin.Activate";
pub const CREATE: &str = "/VolumeDriver.Create";
pub const REMOVE: &str = "/VolumeDriver.Remove";
pub const GET: &str = "/VolumeDriver.Get";
pub const LIST: &str = "/VolumeDriver.List";
pub const PATH: &str = "/VolumeDriver.Path";
pub const MOUNT: &str = "/VolumeDriver.Mount";
pub const UNMOUNT: &str = "/VolumeDriver.Unmount";
pub const CAPABILITIES: &str = "/VolumeDriver.Capabilities";

pub const VOLUME_DRIVER_INTERFACE: &str = "VolumeDriver";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CreateRequest {
    pub name: String,
    pub opts: Option<HashMap<String, String>>,
}

/// Body of Remove, Get and Path.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NameRequest {
    pub name: String,
}

/// Body of Mount and Unmount.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MountRequest {
    pub name: String,
    #[serde(rename = "ID")]
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActivateResponse {
    pub implements: Vec<&'static str>,
}

impl Default for ActivateResponse {
    fn default() -> Self {
        Self {
            implements: vec![VOLUME_DRIVER_INTERFACE],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrResponse {
    #[serde(rename = "Err")]
    pub err: String,
}

/// Empty success body for Create, Remove and Unmount.
#[derive(Debug, Serialize)]
pub struct EmptyResponse {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Volume {
    pub name: String,
    pub mountpoint: PathBuf,
}

impl From<VolumeRecord> for Volume {
    fn from(record: VolumeRecord) -> Self {
        Self {
            name: record.name,
            mountpoint: record.mountpoint,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetResponse {
    pub volume: Volume,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListResponse {
    pub volumes: Vec<Volume>,
}

/// Reply of Path and Mount.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MountpointResponse {
    pub mountpoint: PathBuf,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CapabilitiesResponse {
    pub capabilities: Capability,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Capability {
    pub scope: mapping_core::Scope,
}

impl From<Capabilities> for CapabilitiesResponse {
    fn from(caps: Capabilities) -> Self {
        Self {
            capabilities: Capability { scope: caps.scope },
        }
    }
}
