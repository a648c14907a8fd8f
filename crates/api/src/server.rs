//! HTTP server lifecycle: bind, serve, signal-driven graceful shutdown.
//!
//! A [`Server`] moves through one lifecycle: built, bound to its socket
//! ([`Server::bind`]), then consumed by [`BoundServer::run`], which returns
//! once a termination signal has been received and in-flight requests have
//! drained. There is no global instance and no way to run the same server
//! twice.

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::config::ServerConfig;
use crate::router::build_app_router;
use crate::state::AppState;

/// Errors from the server lifecycle. All of them are fatal; the binary
/// exits non-zero on any of these.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid bind host {host:?}: {source}")]
    Address {
        host: String,
        source: std::net::AddrParseError,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("server failed: {0}")]
    Serve(#[source] std::io::Error),

    #[error("graceful shutdown did not complete within {0:?}")]
    ShutdownTimeout(Duration),
}

/// A configured but not yet listening server.
#[derive(Debug)]
pub struct Server {
    app: Router,
    addr: SocketAddr,
    shutdown_timeout: Option<Duration>,
}

impl Server {
    /// Build a server around the given state and configuration. The
    /// listening socket is not opened until [`Server::bind`].
    pub fn new(state: AppState, config: &ServerConfig) -> Result<Self, ServerError> {
        let ip = config.host.parse().map_err(|source| ServerError::Address {
            host: config.host.clone(),
            source,
        })?;

        Ok(Self {
            app: build_app_router(state, config),
            addr: SocketAddr::new(ip, config.port),
            shutdown_timeout: config.shutdown_timeout,
        })
    }

    /// Open the listening socket. Fails if the address is unavailable.
    pub async fn bind(self) -> Result<BoundServer, ServerError> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: self.addr,
                source,
            })?;
        // With port 0 the OS picks the real port, so re-read it.
        let addr = listener.local_addr().map_err(ServerError::Serve)?;
        tracing::info!(%addr, "server listening");

        Ok(BoundServer {
            app: self.app,
            listener,
            addr,
            shutdown_timeout: self.shutdown_timeout,
        })
    }
}

/// A server that holds its listening socket.
#[derive(Debug)]
pub struct BoundServer {
    app: Router,
    listener: TcpListener,
    addr: SocketAddr,
    shutdown_timeout: Option<Duration>,
}

impl BoundServer {
    /// The address actually bound (useful when configured with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve until SIGINT or SIGTERM arrives, then drain and return.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(shutdown_signal()).await
    }

    /// Serve until `shutdown` completes, then drain and return. [`run`]
    /// passes the OS signal future; tests pass their own trigger.
    ///
    /// [`run`]: BoundServer::run
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        // One background task waits for the trigger, then flips both
        // channels: one starts axum's graceful drain, the other starts the
        // optional drain deadline.
        let (graceful_tx, graceful_rx) = oneshot::channel::<()>();
        let (draining_tx, draining_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            shutdown.await;
            tracing::info!("shutdown requested, draining connections");
            let _ = draining_tx.send(());
            let _ = graceful_tx.send(());
        });

        let serve = axum::serve(self.listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = graceful_rx.await;
            })
            .into_future();
        tokio::pin!(serve);

        let shutdown_timeout = self.shutdown_timeout;
        let drain_deadline = async move {
            let _ = draining_rx.await;
            match shutdown_timeout {
                Some(limit) => {
                    tokio::time::sleep(limit).await;
                    limit
                }
                // No deadline configured: wait for the drain, however long.
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            result = &mut serve => result.map_err(ServerError::Serve)?,
            limit = drain_deadline => {
                tracing::error!(?limit, "graceful shutdown did not complete in time");
                return Err(ServerError::ShutdownTimeout(limit));
            }
        }

        tracing::info!("server shut down");
        Ok(())
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server shuts
/// down cleanly whether stopped interactively or by a process manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}
