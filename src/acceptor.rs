//! Connection accept loop
//!
//! Assigns each accepted connection a fresh identity, registers it and
//! spawns its processor. Runs until the listening endpoint fails.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::COMMAND_BUFFER_SIZE;
use crate::connection::Connection;
use crate::error::AppError;
use crate::handler::handle_connection;
use crate::server::{ChatServer, ServerHandle};
use crate::types::IdentityCounter;

/// Pause before accepting again when out of file descriptors
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

// ENFILE / EMFILE; same values on Linux, macOS and the BSDs
#[cfg(unix)]
const ENFILE: i32 = 23;
#[cfg(unix)]
const EMFILE: i32 = 24;

/// The acceptor: listening endpoint plus identity allocation
pub struct Acceptor {
    listener: TcpListener,
    server: ServerHandle,
    identities: IdentityCounter,
    max_line_length: usize,
}

impl Acceptor {
    pub fn new(listener: TcpListener, server: ServerHandle, max_line_length: usize) -> Self {
        Self {
            listener,
            server,
            identities: IdentityCounter::new(),
            max_line_length,
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the listener becomes unusable
    pub async fn run(self) -> Result<(), AppError> {
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) if is_connection_error(&e) => {
                    warn!("Failed to accept connection: {}", e);
                    continue;
                }
                Err(e) if is_resource_exhausted(&e) => {
                    error!("Failed to accept connection: {}", e);
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
                Err(e) => {
                    error!("Listener failed: {}", e);
                    return Err(AppError::Listener(e));
                }
            };

            let identity = self.identities.next();
            info!("New client connected: {} from {}", identity, peer);

            let (conn, client) =
                Connection::open(identity, Some(peer), stream, self.max_line_length);
            self.server.register(client).await?;

            // Spawn processor task for each connection
            let server = self.server.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(conn, server).await {
                    error!("Connection handler error for {}: {}", identity, e);
                }
            });
        }
    }
}

/// Start the ChatServer actor and accept on `listener` until it fails
pub async fn serve(listener: TcpListener, max_line_length: usize) -> Result<(), AppError> {
    let (server, handle) = ChatServer::channel(COMMAND_BUFFER_SIZE);
    tokio::spawn(server.run());
    info!("ChatServer actor started");

    Acceptor::new(listener, handle, max_line_length).run().await
}

/// Errors that concern only the connection being accepted
fn is_connection_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
    )
}

#[cfg(unix)]
fn is_resource_exhausted(e: &io::Error) -> bool {
    matches!(e.raw_os_error(), Some(ENFILE) | Some(EMFILE))
}

#[cfg(not(unix))]
fn is_resource_exhausted(_e: &io::Error) -> bool {
    false
}
