//! HTTP server and graceful shutdown.
//!
//! On SIGTERM or Ctrl-C the server:
//! 1. stops calling `listener.accept()`, so no new connections are made;
//! 2. lets every in-flight connection task run to completion;
//! 3. returns from [`Server::serve`], so `main` can close the database client.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::method::Method;
use crate::response::Response;
use crate::router::Router;
use crate::status::Status;

/// Largest request body accepted; anything bigger is a `400`.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    pub fn bind(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// Starts accepting connections and dispatching them through `router`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing), or with an error if
    /// the listener cannot be bound.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let router = Arc::new(router);

        info!(addr = %self.addr, "listening");

        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Shutdown is checked first so a SIGTERM stops accepting even
                // while connections are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            async move { handle(&router, req, remote_addr).await }
                        });

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("server stopped");
        Ok(())
    }
}

// ── Request handling ──────────────────────────────────────────────────────────

/// Reads one request off the wire, routes it, and logs the outcome.
///
/// Infallible: every failure is rendered as a status code so hyper never sees
/// an error.
async fn handle<B>(
    router: &Router,
    req: http::Request<B>,
    remote_addr: SocketAddr,
) -> Result<http::Response<Full<Bytes>>, std::convert::Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let path = req.uri().path().to_owned();

    let Ok(method) = Method::try_from(req.method()) else {
        debug!(peer = %remote_addr, method = %req.method(), %path, "unsupported method");
        return Ok(Response::status(Status::MethodNotAllowed).into_inner());
    };

    let response = match Limited::new(req.into_body(), MAX_BODY_BYTES).collect().await {
        Ok(collected) => router.dispatch(method, &path, collected.to_bytes()).await,
        Err(e) if e.is::<LengthLimitError>() => {
            debug!(peer = %remote_addr, %method, %path, limit = MAX_BODY_BYTES, "request body too large");
            Response::status(Status::BadRequest)
        }
        Err(e) => {
            warn!(peer = %remote_addr, %method, %path, "failed to read request body: {e}");
            Response::status(Status::BadRequest)
        }
    };

    let status = response.status_code().as_u16();
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    if status >= 500 {
        warn!(peer = %remote_addr, %method, %path, status, elapsed_ms, "request failed");
    } else {
        debug!(peer = %remote_addr, %method, %path, status, elapsed_ms, "request served");
    }

    Ok(response.into_inner())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives: SIGTERM or
/// SIGINT on Unix, Ctrl-C elsewhere.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;

    const PEER: SocketAddr = SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST), 4000);

    async fn accept(_req: Request) -> Status {
        Status::Ok
    }

    fn request(method: &str, body: Vec<u8>) -> http::Request<Full<Bytes>> {
        http::Request::builder()
            .method(method)
            .uri("/echo")
            .body(Full::new(Bytes::from(body)))
            .unwrap()
    }

    fn router() -> Router {
        Router::new().on(Method::Post, "/echo", accept)
    }

    #[tokio::test]
    async fn routes_known_methods() {
        let res = handle(&router(), request("POST", b"{}".to_vec()), PEER).await.unwrap();
        assert_eq!(res.status(), http::StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_method_token_is_not_allowed() {
        let res = handle(&router(), request("BREW", Vec::new()), PEER).await.unwrap();
        assert_eq!(res.status(), http::StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn oversize_body_is_rejected_before_routing() {
        let res = handle(&router(), request("POST", vec![b' '; MAX_BODY_BYTES + 1]), PEER)
            .await
            .unwrap();
        assert_eq!(res.status(), http::StatusCode::BAD_REQUEST);
    }
}
