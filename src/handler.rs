//! Per-connection processor
//!
//! Drives one connection through Handshaking → Active → Closing:
//! reads the display name, relays every following line through the
//! ChatServer, then releases the stream and deregisters.

use futures_util::{SinkExt, Stream, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use crate::connection::Connection;
use crate::error::AppError;
use crate::message::display_name;
use crate::server::ServerHandle;
use crate::types::Identity;

/// Handle a registered connection until it ends
///
/// The caller must already have registered the connection's `Client`.
/// Read errors end the connection like end-of-stream; only a lost
/// ChatServer is reported as an error.
pub async fn handle_connection<S>(conn: Connection<S>, server: ServerHandle) -> Result<(), AppError>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let Connection {
        identity,
        peer,
        mut reader,
        mut writer,
        mut outbound,
    } = conn;

    debug!("Processing {} ({:?})", identity, peer);

    // Spawn write task (queued lines -> stream)
    let write_task = tokio::spawn(async move {
        while let Some(line) = outbound.recv().await {
            if let Err(e) = writer.send(line).await {
                debug!("Write failed for {}: {}", identity, e);
                break;
            }
        }
        let _ = writer.close().await;
        debug!("Write task ended for {}", identity);
    });

    let result = run_session(identity, &mut reader, &server).await;

    // Closing: release both halves before deregistering
    write_task.abort();
    drop(reader);

    let deregistered = server.disconnect(identity).await;
    info!("Client {} disconnected", identity);

    result.and(deregistered)
}

/// Handshaking and Active states
async fn run_session<R>(
    identity: Identity,
    lines: &mut R,
    server: &ServerHandle,
) -> Result<(), AppError>
where
    R: Stream<Item = Result<String, std::io::Error>> + Unpin,
{
    let name = match lines.next().await {
        Some(Ok(raw)) => display_name(&raw),
        Some(Err(e)) => {
            warn!("Handshake failed for {}: {}", identity, e);
            return Ok(());
        }
        None => {
            debug!("{} closed before handshake", identity);
            return Ok(());
        }
    };

    server.join(identity, name).await?;

    while let Some(line) = lines.next().await {
        match line {
            Ok(text) => server.chat(identity, text).await?,
            Err(e) => {
                warn!("Client {} disconnected unexpectedly: {}", identity, e);
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    use super::*;
    use crate::client::Client;
    use crate::server::ChatServer;

    const WAIT: Duration = Duration::from_secs(5);

    async fn setup() -> (ServerHandle, mpsc::UnboundedReceiver<String>) {
        let (server, handle) = ChatServer::channel(32);
        tokio::spawn(server.run());

        // Observer joined before the connection under test
        let (tx, mut rx) = mpsc::unbounded_channel();
        handle
            .register(Client::new(Identity(2), None, tx))
            .await
            .unwrap();
        handle.join(Identity(2), "observer".into()).await.unwrap();
        assert_eq!(
            rx.recv().await.as_deref(),
            Some("[SERVER]: User2 has joined the chat.")
        );

        (handle, rx)
    }

    async fn recv(rx: &mut mpsc::UnboundedReceiver<String>) -> Option<String> {
        timeout(WAIT, rx.recv()).await.expect("timed out")
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let (handle, mut observer) = setup().await;
        let (client_side, server_side) = tokio::io::duplex(1024);

        let (conn, client) = Connection::open(Identity(1), None, server_side, 64);
        handle.register(client).await.unwrap();
        let task = tokio::spawn(handle_connection(conn, handle.clone()));

        let (read_half, mut write_half) = tokio::io::split(client_side);
        let mut lines = BufReader::new(read_half).lines();

        write_half.write_all(b"alice\r\nhi there\n").await.unwrap();

        let own = timeout(WAIT, lines.next_line()).await.unwrap().unwrap();
        assert_eq!(own.as_deref(), Some("[SERVER]: User1 has joined the chat."));
        assert_eq!(
            recv(&mut observer).await.as_deref(),
            Some("[SERVER]: User1 has joined the chat.")
        );
        assert_eq!(recv(&mut observer).await.as_deref(), Some("[User1]: hi there"));

        // Unterminated final line is still relayed
        write_half.write_all(b"bye").await.unwrap();
        write_half.shutdown().await.unwrap();
        drop(write_half);
        drop(lines);

        assert_eq!(recv(&mut observer).await.as_deref(), Some("[User1]: bye"));
        assert_eq!(
            recv(&mut observer).await.as_deref(),
            Some("[SERVER]: User1 has left the chat.")
        );

        timeout(WAIT, task).await.unwrap().unwrap().unwrap();
        assert_eq!(handle.snapshot().await.unwrap(), vec![Identity(2)]);
    }

    #[tokio::test]
    async fn test_close_during_handshake_is_silent() {
        let (handle, mut observer) = setup().await;
        let (client_side, server_side) = tokio::io::duplex(1024);

        let (conn, client) = Connection::open(Identity(1), None, server_side, 64);
        handle.register(client).await.unwrap();
        let task = tokio::spawn(handle_connection(conn, handle.clone()));

        drop(client_side);

        timeout(WAIT, task).await.unwrap().unwrap().unwrap();
        assert_eq!(handle.snapshot().await.unwrap(), vec![Identity(2)]);
        assert!(observer.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_empty_name_still_joins() {
        let (handle, mut observer) = setup().await;
        let (mut client_side, server_side) = tokio::io::duplex(1024);

        let (conn, client) = Connection::open(Identity(1), None, server_side, 64);
        handle.register(client).await.unwrap();
        let task = tokio::spawn(handle_connection(conn, handle.clone()));

        client_side.write_all(b"\n").await.unwrap();
        assert_eq!(
            recv(&mut observer).await.as_deref(),
            Some("[SERVER]: User1 has joined the chat.")
        );

        drop(client_side);
        assert_eq!(
            recv(&mut observer).await.as_deref(),
            Some("[SERVER]: User1 has left the chat.")
        );
        timeout(WAIT, task).await.unwrap().unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_overlong_line_closes_connection() {
        let (handle, mut observer) = setup().await;
        let (mut client_side, server_side) = tokio::io::duplex(1024);

        let (conn, client) = Connection::open(Identity(1), None, server_side, 64);
        handle.register(client).await.unwrap();
        let task = tokio::spawn(handle_connection(conn, handle.clone()));

        client_side.write_all(b"alice\n").await.unwrap();
        assert_eq!(
            recv(&mut observer).await.as_deref(),
            Some("[SERVER]: User1 has joined the chat.")
        );

        // Peer stays open but never ends the line
        client_side.write_all(&[b'x'; 100]).await.unwrap();

        assert_eq!(
            recv(&mut observer).await.as_deref(),
            Some("[SERVER]: User1 has left the chat.")
        );
        timeout(WAIT, task).await.unwrap().unwrap().unwrap();
        assert_eq!(handle.snapshot().await.unwrap(), vec![Identity(2)]);
        drop(client_side);
    }
}
