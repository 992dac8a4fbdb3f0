//! Server execution logic.

use std::{net::SocketAddr, sync::Arc};

use tokio::{net::TcpListener, task::JoinSet};
use tokio_util::sync::CancellationToken;

use crate::{
    domain::Broadcaster,
    infrastructure::{RegistryBroadcaster, SessionRegistry},
};

use super::{
    config::ServerConfig,
    error::ServerError,
    handler::{http, session::handle_connection},
    signal::shutdown_signal,
    state::AppState,
};

/// Line chat server
///
/// Owns the listening sockets, the shared state and the shutdown token. Binding and running are
/// separate steps so callers can learn the bound address (port 0) before serving.
///
/// # Example
///
/// ```ignore
/// let server = Server::bind(&ServerConfig::default()).await?;
/// let shutdown = server.shutdown_token();
/// tokio::spawn(async move { shutdown_signal().await; shutdown.cancel() });
/// server.run().await?;
/// ```
pub struct Server {
    listener: TcpListener,
    admin_listener: Option<TcpListener>,
    state: Arc<AppState>,
    shutdown: CancellationToken,
}

impl Server {
    /// Bind the chat listener (and the admin listener when configured)
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] or [`ServerError::AdminBind`] when an address cannot be
    /// bound.
    pub async fn bind(config: &ServerConfig) -> Result<Self, ServerError> {
        // Initialize dependencies in order:
        // 1. Registry
        // 2. Broadcaster
        // 3. AppState (UseCases)
        let registry = Arc::new(SessionRegistry::new());
        let broadcaster: Arc<dyn Broadcaster> =
            Arc::new(RegistryBroadcaster::new(registry.clone()));
        let state = Arc::new(AppState::new(
            registry,
            broadcaster,
            config.max_line_length,
        ));

        let listener = TcpListener::bind(config.bind_addr())
            .await
            .map_err(ServerError::Bind)?;

        let admin_listener = match config.admin_addr() {
            Some(addr) => Some(
                TcpListener::bind(addr)
                    .await
                    .map_err(ServerError::AdminBind)?,
            ),
            None => None,
        };

        Ok(Self {
            listener,
            admin_listener,
            state,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener.local_addr().map_err(ServerError::Bind)
    }

    pub fn admin_addr(&self) -> Option<SocketAddr> {
        self.admin_listener
            .as_ref()
            .and_then(|listener| listener.local_addr().ok())
    }

    pub fn registry(&self) -> Arc<SessionRegistry> {
        self.state.registry.clone()
    }

    /// Cancelling this token stops the accept loop and closes every session.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Accept connections until the shutdown token is cancelled
    ///
    /// Each connection runs in its own task. After cancellation no new connection is accepted,
    /// every session runs its close sequence, and this returns once all of them have finished.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Admin`] if the admin HTTP server fails.
    pub async fn run(self) -> Result<(), ServerError> {
        let Self {
            listener,
            admin_listener,
            state,
            shutdown,
        } = self;

        if let Ok(addr) = listener.local_addr() {
            tracing::info!("Chat server listening on {}", addr);
        }

        let admin_task = admin_listener.map(|admin_listener| {
            if let Ok(addr) = admin_listener.local_addr() {
                tracing::info!("Admin API listening on http://{}/api", addr);
            }
            let app = http::router(state.clone());
            let token = shutdown.clone();
            tokio::spawn(async move {
                axum::serve(admin_listener, app)
                    .with_graceful_shutdown(async move { token.cancelled().await })
                    .await
            })
        });

        tracing::info!("Press Ctrl+C to shutdown gracefully");

        let mut sessions = JoinSet::new();
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        if let Err(e) = stream.set_nodelay(true) {
                            tracing::debug!(%peer, "Failed to set TCP_NODELAY: {}", e);
                        }
                        sessions.spawn(handle_connection(
                            stream,
                            peer,
                            state.clone(),
                            shutdown.clone(),
                        ));
                    }
                    Err(e) => {
                        tracing::warn!("Failed to accept connection: {}", e);
                    }
                },
                // reap finished sessions
                Some(joined) = sessions.join_next(), if !sessions.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!("Session task failed: {}", e);
                    }
                }
            }
        }

        drop(listener);
        tracing::info!(
            "Shutting down, waiting for {} session(s) to close",
            sessions.len()
        );
        while let Some(joined) = sessions.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Session task failed: {}", e);
            }
        }

        if let Some(admin_task) = admin_task {
            match admin_task.await {
                Ok(result) => result.map_err(ServerError::Admin)?,
                Err(e) => tracing::error!("Admin server task failed: {}", e),
            }
        }

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Bind with `config` and serve until Ctrl+C or SIGTERM.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let server = Server::bind(&config).await?;

    let shutdown = server.shutdown_token();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.cancel();
    });

    server.run().await
}
