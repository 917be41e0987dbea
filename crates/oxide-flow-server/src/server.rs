//! HTTP/1.1 transport for a [`Router`].
//!
//! Every accepted connection is served on its own tokio task. The router is
//! shared read-only across tasks; each request gets a fresh context.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderName, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::StatusCode;
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use oxide_flow::{Method, Request, Response, Router};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::Result;

/// Pause after a failed accept, so errors like EMFILE do not spin the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Binds the configured address and serves until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound.
pub async fn serve(router: Router, config: &ServerConfig) -> Result<()> {
    let listener = TcpListener::bind(config.addr.socket_addr()).await?;
    serve_with_shutdown(
        listener,
        Arc::new(router),
        config.shutdown_timeout,
        shutdown_signal(),
    )
    .await
}

/// Serves connections from `listener` until `signal` completes.
///
/// After the signal, no new connections are accepted and open ones are
/// given up to `grace` to finish.
///
/// # Errors
///
/// Returns an error if the listener's local address cannot be read.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    router: Arc<Router>,
    grace: Duration,
    signal: F,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    let addr = listener.local_addr()?;
    info!(address = %addr, "server listening");

    let graceful = GracefulShutdown::new();
    tokio::pin!(signal);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(err) => {
                        warn!(error = %err, "failed to accept connection");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                        continue;
                    }
                };

                let router = Arc::clone(&router);
                let service = service_fn(move |req| {
                    let router = Arc::clone(&router);
                    async move { Ok::<_, Infallible>(handle_request(&router, req).await) }
                });

                let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
                let conn = graceful.watch(conn);

                tokio::spawn(async move {
                    if let Err(err) = conn.await {
                        debug!(peer = %peer, error = %err, "connection closed with error");
                    }
                });
            }
            () = &mut signal => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    drop(listener);

    tokio::select! {
        () = graceful.shutdown() => info!("all connections closed"),
        () = tokio::time::sleep(grace) => {
            warn!(timeout = ?grace, "timed out waiting for connections to close");
        }
    }

    Ok(())
}

/// Converts a hyper request, dispatches it, and converts the response back.
async fn handle_request(
    router: &Router,
    req: hyper::Request<Incoming>,
) -> hyper::Response<Full<Bytes>> {
    let Some(method) = Method::parse(req.method().as_str()) else {
        return into_hyper(Response::new(501).body("Not Implemented"));
    };

    let Some(path) = Request::decode_path(req.uri().path()) else {
        debug!(path = req.uri().path(), "request path is not valid UTF-8");
        return into_hyper(Response::bad_request());
    };

    let mut request = Request::new(method, path);
    if let Some(query) = req.uri().query() {
        request.query = Request::parse_query_string(query);
    }
    for (key, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            request
                .headers
                .entry(key.to_string())
                .and_modify(|joined| {
                    joined.push_str(", ");
                    joined.push_str(v);
                })
                .or_insert_with(|| v.to_string());
        }
    }

    match req.into_body().collect().await {
        Ok(body) => request.body = body.to_bytes().to_vec(),
        Err(err) => {
            debug!(error = %err, "failed to read request body");
            return into_hyper(Response::bad_request());
        }
    }

    into_hyper(router.handle(request).await)
}

fn into_hyper(res: Response) -> hyper::Response<Full<Bytes>> {
    let mut out = hyper::Response::new(Full::new(Bytes::from(res.body)));
    *out.status_mut() =
        StatusCode::from_u16(res.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    for (key, value) in res.headers {
        match (HeaderName::from_bytes(key.as_bytes()), HeaderValue::from_str(&value)) {
            (Ok(name), Ok(value)) => {
                out.headers_mut().insert(name, value);
            }
            _ => warn!(header = %key, "dropping invalid response header"),
        }
    }

    out
}

/// Waits for Ctrl-C.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for Ctrl-C; shutdown signal disabled");
        std::future::pending::<()>().await;
    }
}
