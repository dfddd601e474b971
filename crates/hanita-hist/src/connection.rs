//! Per-connection handling
//!
//! Each accepted socket gets its own [`ConnectionHandler`] task. Every read
//! is treated as one complete message: it is decoded on its own and, when
//! valid, handed to the store on the blocking pool without waiting for the
//! result. Nothing is ever written back to the peer.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn, Span};

use hanita_core::{decode, SessionEvent};
use hanita_storage::{HistoryStore, StorageError};

/// Owns one client connection for its whole lifetime
pub struct ConnectionHandler {
    stream: TcpStream,
    peer: SocketAddr,
    store: Arc<HistoryStore>,
    read_buffer_size: usize,
    shutdown: watch::Receiver<bool>,
}

impl ConnectionHandler {
    /// Create a handler for an accepted stream
    pub fn new(
        stream: TcpStream,
        peer: SocketAddr,
        store: Arc<HistoryStore>,
        read_buffer_size: usize,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            stream,
            peer,
            store,
            read_buffer_size,
            shutdown,
        }
    }

    /// Read and dispatch chunks until the peer disconnects, a read fails or
    /// shutdown is signalled
    ///
    /// Appends already dispatched are left running when this returns.
    #[instrument(name = "connection", skip_all, fields(peer = %self.peer))]
    pub async fn run(self) {
        let Self {
            mut stream,
            store,
            read_buffer_size,
            mut shutdown,
            ..
        } = self;

        let mut buf = vec![0u8; read_buffer_size];
        debug!("Connection opened");

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    debug!("Shutdown requested, closing connection");
                    break;
                }
                read = stream.read(&mut buf) => match read {
                    Ok(0) => {
                        debug!("Peer closed connection");
                        break;
                    }
                    Ok(n) => {
                        handle_chunk(&store, &buf[..n]);
                    }
                    Err(e) => {
                        warn!(error = %e, "Read failed, closing connection");
                        break;
                    }
                },
            }
        }
    }
}

/// Decode one received chunk and dispatch the append if it is valid
///
/// Returns the append task so callers that care (tests) can wait for it;
/// the connection loop drops it.
pub fn handle_chunk(store: &Arc<HistoryStore>, chunk: &[u8]) -> Option<JoinHandle<()>> {
    match decode(chunk) {
        Ok(event) => Some(dispatch_append(Arc::clone(store), event)),
        Err(reason) => {
            warn!(
                reason = reason.kind(),
                error = %reason,
                bytes = chunk.len(),
                "Rejected message"
            );
            None
        }
    }
}

fn dispatch_append(store: Arc<HistoryStore>, event: SessionEvent) -> JoinHandle<()> {
    let span = Span::current();
    tokio::task::spawn_blocking(move || {
        let _entered = span.enter();
        let SessionEvent {
            user_id,
            action,
            timestamp,
        } = event;

        match store.append(user_id, &action, timestamp) {
            Ok(id) => {
                info!(%id, user_id, action = %action, timestamp, "Event recorded");
            }
            Err(StorageError::InvalidAction(action)) => {
                warn!(user_id, action = %action, "Rejected event with unknown action");
            }
            Err(e) => {
                error!(user_id, action = %action, error = %e, "Failed to record event");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hanita_core::EventId;
    use hanita_storage::HistoryStoreConfig;
    use tempfile::TempDir;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    fn create_test_store() -> (Arc<HistoryStore>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = HistoryStoreConfig::default().with_db_path(temp_dir.path().join("hist.redb"));
        (Arc::new(HistoryStore::open(config).unwrap()), temp_dir)
    }

    #[tokio::test]
    async fn test_valid_chunk_is_appended() {
        let (store, _temp) = create_test_store();

        let task = handle_chunk(
            &store,
            br#"{"user_id":355,"action":"enter","timestamp":34523.23322}"#,
        )
        .expect("valid chunk dispatches an append");
        task.await.unwrap();

        let record = store.get(EventId::new(1)).unwrap().unwrap();
        assert_eq!(record.user_id, 355);
        assert_eq!(record.timestamp, 34523.23322);
    }

    #[tokio::test]
    async fn test_rejected_chunks_dispatch_nothing() {
        let (store, _temp) = create_test_store();

        assert!(handle_chunk(&store, b"not json at all").is_none());
        assert!(handle_chunk(&store, br#"{"user_id":1,"action":"enter"}"#).is_none());
        assert!(handle_chunk(&store, &[0xc3, 0x28]).is_none());

        assert_eq!(store.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_action_is_dropped_by_store() {
        let (store, _temp) = create_test_store();

        let task = handle_chunk(&store, br#"{"user_id":1,"action":"leave","timestamp":1.0}"#)
            .expect("decoder passes unknown actions through");
        task.await.unwrap();

        assert_eq!(store.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_append_after_store_closed_is_logged_not_panicking() {
        let (store, _temp) = create_test_store();
        store.close();

        let task = handle_chunk(&store, br#"{"user_id":1,"action":"quit","timestamp":1.0}"#).unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_handler_stops_on_shutdown() {
        let (store, _temp) = create_test_store();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut client = TcpStream::connect(addr).await.unwrap();
        let (stream, peer) = listener.accept().await.unwrap();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handler = ConnectionHandler::new(stream, peer, Arc::clone(&store), 1024, shutdown_rx);
        let task = tokio::spawn(handler.run());

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(std::time::Duration::from_secs(5), task)
            .await
            .expect("handler exits after shutdown")
            .unwrap();

        // Server side is gone; the client sees EOF
        let mut buf = [0u8; 8];
        let n = client.read(&mut buf).await.unwrap();
        assert_eq!(n, 0);
        client.shutdown().await.ok();
    }
}
