use hyper::StatusCode;
use mapping_core::{MappingResult, VolumeDriver};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::protocol::{
    self, ActivateResponse, CapabilitiesResponse, CreateRequest, EmptyResponse, ErrResponse,
    GetResponse, ListResponse, MountRequest, MountpointResponse, NameRequest, Volume,
};

/// Status and JSON body produced for one plugin call.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl Reply {
    fn json<T: Serialize>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self { status, body },
            Err(e) => Self::error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        }
    }

    pub fn error(status: StatusCode, err: impl Into<String>) -> Self {
        let body = ErrResponse { err: err.into() };
        Self {
            status,
            body: serde_json::to_vec(&body).unwrap_or_default(),
        }
    }
}

// The daemon sends an empty body for calls without arguments.
fn decode<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, Reply> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!("Rejecting undecodable request: {}", e);
        Reply::error(StatusCode::BAD_REQUEST, e.to_string())
    })
}

fn respond<T: Serialize>(result: MappingResult<T>) -> Reply {
    match result {
        Ok(value) => Reply::json(StatusCode::OK, &value),
        Err(e) => Reply::error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Route one plugin API call at `path` to `driver`.
pub fn dispatch(driver: &dyn VolumeDriver, path: &str, body: &[u8]) -> Reply {
    match handle(driver, path, body) {
        Ok(reply) | Err(reply) => reply,
    }
}

fn handle(driver: &dyn VolumeDriver, path: &str, body: &[u8]) -> Result<Reply, Reply> {
    let reply = match path {
        protocol::ACTIVATE => Reply::json(StatusCode::OK, &ActivateResponse::default()),
        protocol::CREATE => {
            let req: CreateRequest = decode(body)?;
            let opts = req.opts.unwrap_or_default();
            respond(driver.create(&req.name, &opts).map(|()| EmptyResponse {}))
        }
        protocol::REMOVE => {
            let req: NameRequest = decode(body)?;
            respond(driver.remove(&req.name).map(|()| EmptyResponse {}))
        }
        protocol::GET => {
            let req: NameRequest = decode(body)?;
            respond(driver.get(&req.name).map(|record| GetResponse {
                volume: record.into(),
            }))
        }
        protocol::LIST => respond(driver.list().map(|records| ListResponse {
            volumes: records.into_iter().map(Volume::from).collect(),
        })),
        protocol::PATH => {
            let req: NameRequest = decode(body)?;
            respond(
                driver
                    .path(&req.name)
                    .map(|mountpoint| MountpointResponse { mountpoint }),
            )
        }
        protocol::MOUNT => {
            let req: MountRequest = decode(body)?;
            respond(
                driver
                    .mount(&req.name, &req.id)
                    .map(|mountpoint| MountpointResponse { mountpoint }),
            )
        }
        protocol::UNMOUNT => {
            let req: MountRequest = decode(body)?;
            respond(driver.unmount(&req.name, &req.id).map(|()| EmptyResponse {}))
        }
        protocol::CAPABILITIES => Reply::json(
            StatusCode::OK,
            &CapabilitiesResponse::from(driver.capabilities()),
        ),
        other => {
            tracing::warn!(path = other, "Unknown plugin endpoint");
            Reply::error(StatusCode::NOT_FOUND, format!("unknown endpoint {}", other))
        }
    };
    Ok(reply)
}
