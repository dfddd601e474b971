//! TCP accept loop

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, error, info};

use hanita_storage::HistoryStore;

use crate::connection::ConnectionHandler;
use crate::error::{ServiceError, ServiceResult};

/// A bound listening socket
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind the service address
    pub async fn bind(addr: &str) -> ServiceResult<Self> {
        let bind_failure = |source| ServiceError::BindFailure {
            addr: addr.to_string(),
            source,
        };

        let inner = TcpListener::bind(addr).await.map_err(bind_failure)?;
        let local_addr = inner.local_addr().map_err(bind_failure)?;

        info!(addr = %local_addr, "Listening");
        Ok(Self { inner, local_addr })
    }

    /// The address actually bound (resolves port `0`)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept connections until shutdown is signalled
    ///
    /// Spawns one [`ConnectionHandler`] per connection with no limit on how
    /// many run at once. The listening socket is released when this returns;
    /// connections already accepted are not aborted here.
    pub async fn run(
        self,
        store: Arc<HistoryStore>,
        read_buffer_size: usize,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!(addr = %self.local_addr, "Listener shutting down");
                    break;
                }
                accepted = self.inner.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!(%peer, "Accepted connection");
                        let handler = ConnectionHandler::new(
                            stream,
                            peer,
                            Arc::clone(&store),
                            read_buffer_size,
                            shutdown.clone(),
                        );
                        tokio::spawn(handler.run());
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to accept connection");
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let listener = Listener::bind("127.0.0.1:0").await.unwrap();
        assert_ne!(listener.local_addr().port(), 0);
    }

    #[tokio::test]
    async fn test_bind_busy_port_fails() {
        let first = Listener::bind("127.0.0.1:0").await.unwrap();
        let addr = first.local_addr().to_string();

        let err = Listener::bind(&addr).await.err().unwrap();
        match err {
            ServiceError::BindFailure { addr: failed, .. } => assert_eq!(failed, addr),
            other => panic!("expected BindFailure, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_bind_invalid_address_fails() {
        let err = Listener::bind("not an address").await.err().unwrap();
        assert!(matches!(err, ServiceError::BindFailure { .. }));
    }
}
