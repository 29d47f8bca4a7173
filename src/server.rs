//! ChatServer Actor implementation
//!
//! The central actor that owns the registry. Acceptor and per-connection
//! processors reach it only through `ServerHandle`, so registry updates and
//! broadcast passes never race each other.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::broadcast::broadcast;
use crate::client::Client;
use crate::error::AppError;
use crate::message::{Notice, Origin};
use crate::registry::Registry;
use crate::types::Identity;

/// Commands sent to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New connection accepted
    Register { client: Client },
    /// Handshake completed
    Join {
        identity: Identity,
        display_name: String,
    },
    /// A line read from a joined client
    Chat { identity: Identity, text: String },
    /// Connection ended
    Disconnect { identity: Identity },
    /// Report registered identities
    Snapshot { reply: oneshot::Sender<Vec<Identity>> },
}

/// The main ChatServer actor
///
/// Processes commands from the acceptor and connection handlers.
pub struct ChatServer {
    /// All registered connections
    registry: Registry,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer {
    /// Create a new ChatServer with the given command receiver
    pub fn new(receiver: mpsc::Receiver<ServerCommand>) -> Self {
        Self {
            registry: Registry::new(),
            receiver,
        }
    }

    /// Create an actor together with a handle for reaching it
    pub fn channel(buffer: usize) -> (Self, ServerHandle) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self::new(rx), ServerHandle::new(tx))
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously receives and processes commands until all handles are dropped.
    pub async fn run(mut self) {
        info!("ChatServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("ChatServer shutting down");
    }

    /// Process a single command
    fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Register { client } => self.handle_register(client),
            ServerCommand::Join {
                identity,
                display_name,
            } => self.handle_join(identity, display_name),
            ServerCommand::Chat { identity, text } => self.handle_chat(identity, text),
            ServerCommand::Disconnect { identity } => self.handle_disconnect(identity),
            ServerCommand::Snapshot { reply } => {
                let _ = reply.send(self.registry.snapshot());
            }
        }
    }

    fn handle_register(&mut self, client: Client) {
        let identity = client.identity;
        match client.peer {
            Some(peer) => debug!("Registering {} ({})", identity, peer),
            None => debug!("Registering {}", identity),
        }
        if self.registry.insert(client).is_some() {
            debug!("Replaced existing registry entry for {}", identity);
        }
        debug!("Total clients: {}", self.registry.len());
    }

    fn handle_join(&mut self, identity: Identity, display_name: String) {
        let Some(client) = self.registry.get_mut(identity) else {
            return;
        };

        info!("{} joined as '{}'", identity, display_name);
        client.set_display_name(display_name);

        self.dispatch(Origin::Server, &Notice::Joined(identity).text());
    }

    fn handle_chat(&mut self, identity: Identity, text: String) {
        if !self.registry.get(identity).is_some_and(Client::has_joined) {
            debug!("Dropping line from unjoined {}", identity);
            return;
        }

        debug!("Received from {}: {}", identity, text);
        self.dispatch(Origin::Client(identity), &text);
    }

    fn handle_disconnect(&mut self, identity: Identity) {
        let Some(client) = self.registry.remove(identity) else {
            return;
        };

        info!("Client disconnected: {}", identity);
        if client.has_joined() {
            self.dispatch(Origin::Server, &Notice::Left(identity).text());
        }

        debug!("Total clients: {}", self.registry.len());
    }

    /// Broadcast and report recipients whose writer has already exited
    ///
    /// Those recipients are left registered; their own processor removes
    /// them once its read side ends.
    fn dispatch(&self, origin: Origin, text: &str) {
        let delivery = broadcast(&self.registry, origin, text);
        if !delivery.failed.is_empty() {
            warn!(
                "Line from {} not delivered to {:?} ({} delivered)",
                origin, delivery.failed, delivery.delivered
            );
        }
    }
}

/// Cloneable handle to the ChatServer actor
#[derive(Debug, Clone)]
pub struct ServerHandle {
    sender: mpsc::Sender<ServerCommand>,
}

impl ServerHandle {
    pub fn new(sender: mpsc::Sender<ServerCommand>) -> Self {
        Self { sender }
    }

    async fn send(&self, cmd: ServerCommand) -> Result<(), AppError> {
        self.sender.send(cmd).await.map_err(|_| AppError::ChannelSend)
    }

    /// Add a freshly accepted connection to the registry
    pub async fn register(&self, client: Client) -> Result<(), AppError> {
        self.send(ServerCommand::Register { client }).await
    }

    /// Complete the handshake and announce the arrival
    pub async fn join(&self, identity: Identity, display_name: String) -> Result<(), AppError> {
        self.send(ServerCommand::Join {
            identity,
            display_name,
        })
        .await
    }

    /// Relay one line from `identity` to everyone else
    pub async fn chat(&self, identity: Identity, text: String) -> Result<(), AppError> {
        self.send(ServerCommand::Chat { identity, text }).await
    }

    /// Remove `identity`; announces the departure if it had joined
    pub async fn disconnect(&self, identity: Identity) -> Result<(), AppError> {
        self.send(ServerCommand::Disconnect { identity }).await
    }

    /// Identities currently registered
    pub async fn snapshot(&self) -> Result<Vec<Identity>, AppError> {
        let (reply, rx) = oneshot::channel();
        self.send(ServerCommand::Snapshot { reply }).await?;
        rx.await.map_err(|_| AppError::ChannelRecv)
    }
}
