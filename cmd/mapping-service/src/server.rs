use std::convert::Infallible;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use mapping_core::{MappingStore, VolumeDriver};
use tokio::net::UnixListener;
use tokio::signal::unix::{signal, SignalKind};

use crate::cli::Cli;
use crate::dispatch::{dispatch, Reply};
use crate::protocol;

fn bind(socket_path: &Path) -> anyhow::Result<UnixListener> {
    // Remove socket left behind by a previous run
    if socket_path.exists() {
        std::fs::remove_file(socket_path)
            .with_context(|| format!("Failed to remove stale socket {}", socket_path.display()))?;
    }
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    UnixListener::bind(socket_path)
        .with_context(|| format!("Failed to bind {}", socket_path.display()))
}

/// Serve the plugin API for `driver` on `socket_path` until `shutdown`
/// resolves, then remove the socket.
pub async fn serve<F>(
    driver: Arc<dyn VolumeDriver>,
    socket_path: &Path,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    let listener = bind(socket_path)?;
    tracing::info!("Listening on {}", socket_path.display());

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => {
                let stream = match accepted {
                    Ok((stream, _)) => stream,
                    Err(e) => {
                        tracing::warn!("Failed to accept connection: {}", e);
                        continue;
                    }
                };
                let driver = Arc::clone(&driver);
                tokio::spawn(async move {
                    let service = service_fn(move |req| handle(Arc::clone(&driver), req));
                    if let Err(e) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await
                    {
                        tracing::warn!("Connection error: {}", e);
                    }
                });
            }
        }
    }

    if let Err(e) = std::fs::remove_file(socket_path) {
        tracing::warn!("Failed to remove socket {}: {}", socket_path.display(), e);
    }
    tracing::info!("Stopped listening on {}", socket_path.display());
    Ok(())
}

async fn handle(
    driver: Arc<dyn VolumeDriver>,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    if req.method() != Method::POST {
        let reply = Reply::error(
            StatusCode::METHOD_NOT_ALLOWED,
            format!("method {} not allowed", req.method()),
        );
        return Ok(into_response(reply));
    }

    let path = req.uri().path().to_string();
    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            let reply = Reply::error(StatusCode::BAD_REQUEST, e.to_string());
            return Ok(into_response(reply));
        }
    };

    // Driver calls hold a std mutex across disk writes.
    let reply = tokio::task::spawn_blocking(move || dispatch(driver.as_ref(), &path, &body))
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Plugin call panicked: {}", e);
            Reply::error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        });
    Ok(into_response(reply))
}

fn into_response(reply: Reply) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(reply.body)));
    *response.status_mut() = reply.status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(protocol::CONTENT_TYPE));
    response
}

async fn shutdown_signal() {
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = terminate => {}
        _ = interrupt => {}
    }
    tracing::info!("Shutdown signal received");
}

/// Open the store and serve it until the process is signalled.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let driver: Arc<dyn VolumeDriver> = Arc::new(MappingStore::open(&cli.state_dir));
    serve(driver, &cli.socket, shutdown_signal()).await
}
