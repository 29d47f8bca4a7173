//! Client struct definition
//!
//! The registry's view of a connection: its identity and the shared
//! write side used by the broadcaster.

use std::net::SocketAddr;

use tokio::sync::mpsc;

use crate::error::SendError;
use crate::types::Identity;

/// Registered connection handle
///
/// The read side stays with the connection's processor; this holds the
/// outbound queue drained by the connection's writer task.
#[derive(Debug)]
pub struct Client {
    /// Server-assigned identity
    pub identity: Identity,
    /// Peer address, if known
    pub peer: Option<SocketAddr>,
    /// Self-reported name (None until handshake completes)
    pub display_name: Option<String>,
    /// Server → Client line queue
    pub sender: mpsc::UnboundedSender<String>,
}

impl Client {
    /// Create a new client with the given identity and sender channel
    pub fn new(
        identity: Identity,
        peer: Option<SocketAddr>,
        sender: mpsc::UnboundedSender<String>,
    ) -> Self {
        Self {
            identity,
            peer,
            display_name: None,
            sender,
        }
    }

    /// Queue one line for this client
    ///
    /// Never drops a line for a live writer; fails only once the
    /// writer task has gone away.
    pub fn send(&self, line: String) -> Result<(), SendError> {
        self.sender
            .send(line)
            .map_err(|_| SendError::ChannelClosed)
    }

    /// Whether the handshake has completed
    pub fn has_joined(&self) -> bool {
        self.display_name.is_some()
    }

    /// Set the client's self-reported display name
    pub fn set_display_name(&mut self, name: String) {
        self.display_name = Some(name);
    }
}
