//! Server Implementation
//!
//! HTTP 服务器启动和管理

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::core::{Config, Result, ServerError, ServerState, build_app};

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    fn state(&self) -> ServerState {
        match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config),
        }
    }

    /// Bind the configured port and serve until Ctrl+C
    pub async fn run(&self) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown_signal` resolves
    ///
    /// On shutdown every live order stream is closed first, then in-flight
    /// requests get `shutdown_timeout_ms` to finish.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown_signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let state = self.state();
        let live = state.live.clone();
        let app = build_app(state);

        let addr = listener.local_addr()?;
        tracing::info!("🍳 Kitchen server listening on {}", addr);

        let draining = CancellationToken::new();
        let drain_trigger = draining.clone();
        tokio::spawn(async move {
            shutdown_signal.await;
            live.shutdown();
            drain_trigger.cancel();
        });

        let server = axum::serve(listener, app)
            .with_graceful_shutdown(draining.clone().cancelled_owned())
            .into_future();

        let timeout = Duration::from_millis(self.config.shutdown_timeout_ms);
        tokio::select! {
            result = server => result?,
            _ = async {
                draining.cancelled().await;
                tokio::time::sleep(timeout).await;
            } => {
                tracing::warn!(timeout_ms = self.config.shutdown_timeout_ms, "Graceful shutdown timed out");
            }
        }

        tracing::info!("Kitchen server stopped");
        Ok(())
    }
}
